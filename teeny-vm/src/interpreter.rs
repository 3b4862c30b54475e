use std::io::Write;

use teeny_class_file::method::MethodInfo;
use teeny_class_file::ClassFile;

use crate::error::{JvmError, Result};
use crate::heap::Heap;
use crate::opcode;

/// The fixed-capacity operand stack of one active call (spec §3 "Operand
/// stack").
struct OperandStack {
    values: Vec<i32>,
    max_stack: usize,
}

impl OperandStack {
    fn new(max_stack: u16) -> Self {
        Self {
            values: Vec::with_capacity(max_stack as usize),
            max_stack: max_stack as usize,
        }
    }

    fn push(&mut self, value: i32) -> Result<()> {
        if self.values.len() >= self.max_stack {
            return Err(JvmError::StackOverflow);
        }
        self.values.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<i32> {
        self.values.pop().ok_or(JvmError::StackUnderflow)
    }

    fn top(&self) -> Result<i32> {
        self.values.last().copied().ok_or(JvmError::StackUnderflow)
    }
}

/// One active call frame: program counter, operand stack, and a borrow of
/// this call's locals array (spec §3 "Lifecycle": created at method entry,
/// destroyed at method return, on every exit path).
struct Frame<'a> {
    pc: usize,
    stack: OperandStack,
    locals: &'a mut [i32],
    code: &'a [u8],
}

/// Interprets `method`'s bytecode to completion. `locals` must already be
/// sized to `method`'s `max_locals` and hold the caller-supplied arguments
/// in slots `0..num_params`. `class` is the (read-only) class image the
/// method belongs to; `heap` is the (single, shared) integer-array heap.
/// `stdout` receives the decimal output of the `println` intrinsic (spec
/// §4.3 "The println intrinsic").
///
/// Returns `Ok(None)` for a void return, `Ok(Some(v))` for an integer or
/// reference return (spec §4.3 "Result").
pub fn execute(
    method: &MethodInfo,
    mut locals: Vec<i32>,
    class: &ClassFile,
    heap: &mut Heap,
    stdout: &mut impl Write,
) -> Result<Option<i32>> {
    let code_attr = method.code.as_ref().ok_or(JvmError::MethodNotFound(
        method.name.clone(),
        method.descriptor.clone(),
    ))?;

    log::debug!(
        "entering {}{} (max_stack={}, max_locals={})",
        method.name,
        method.descriptor,
        code_attr.max_stack,
        code_attr.max_locals
    );

    let mut frame = Frame {
        pc: 0,
        stack: OperandStack::new(code_attr.max_stack),
        locals: &mut locals,
        code: &code_attr.code,
    };

    loop {
        if frame.pc >= frame.code.len() {
            // Implicit void return, tolerated for robustness (spec §4.3
            // "Dispatch").
            return Ok(None);
        }

        let opcode = frame.code[frame.pc];
        match opcode {
            opcode::NOP => frame.pc += 1,

            opcode::ICONST_M1..=opcode::ICONST_5 => {
                let value = opcode as i32 - opcode::ICONST_0 as i32;
                frame.stack.push(value)?;
                frame.pc += 1;
            }

            opcode::BIPUSH => {
                let value = frame.code[frame.pc + 1] as i8 as i32;
                frame.stack.push(value)?;
                frame.pc += 2;
            }

            opcode::SIPUSH => {
                let value = read_u16(frame.code, frame.pc + 1) as i16 as i32;
                frame.stack.push(value)?;
                frame.pc += 3;
            }

            opcode::LDC => {
                // JVMS-correct: the index is used as given (1-based),
                // never decremented (spec §9 resolved open question).
                let index = frame.code[frame.pc + 1] as u16;
                let value = class.get_integer_constant(index)?;
                frame.stack.push(value)?;
                frame.pc += 2;
            }

            opcode::ILOAD | opcode::ALOAD => {
                let index = frame.code[frame.pc + 1] as usize;
                frame.stack.push(local_at(frame.locals, index)?)?;
                frame.pc += 2;
            }

            opcode::ILOAD_0..=0x1d /* iload_3 */ => {
                let index = (opcode - opcode::ILOAD_0) as usize;
                frame.stack.push(local_at(frame.locals, index)?)?;
                frame.pc += 1;
            }

            opcode::ALOAD_0..=0x2d /* aload_3 */ => {
                let index = (opcode - opcode::ALOAD_0) as usize;
                frame.stack.push(local_at(frame.locals, index)?)?;
                frame.pc += 1;
            }

            opcode::ISTORE | opcode::ASTORE => {
                let index = frame.code[frame.pc + 1] as usize;
                let value = frame.stack.pop()?;
                store_local(frame.locals, index, value)?;
                frame.pc += 2;
            }

            opcode::ISTORE_0..=0x3e /* istore_3 */ => {
                let index = (opcode - opcode::ISTORE_0) as usize;
                let value = frame.stack.pop()?;
                store_local(frame.locals, index, value)?;
                frame.pc += 1;
            }

            opcode::ASTORE_0..=0x4e /* astore_3 */ => {
                let index = (opcode - opcode::ASTORE_0) as usize;
                let value = frame.stack.pop()?;
                store_local(frame.locals, index, value)?;
                frame.pc += 1;
            }

            opcode::IINC => {
                let index = frame.code[frame.pc + 1] as usize;
                let delta = frame.code[frame.pc + 2] as i8 as i32;
                let slot = local_at_mut(frame.locals, index)?;
                *slot = slot.wrapping_add(delta);
                frame.pc += 3;
            }

            opcode::IADD | opcode::ISUB | opcode::IMUL => {
                let b = frame.stack.pop()?;
                let a = frame.stack.pop()?;
                let result = match opcode {
                    opcode::IADD => a.wrapping_add(b),
                    opcode::ISUB => a.wrapping_sub(b),
                    opcode::IMUL => a.wrapping_mul(b),
                    _ => unreachable!(),
                };
                frame.stack.push(result)?;
                frame.pc += 1;
            }

            opcode::IDIV | opcode::IREM => {
                let b = frame.stack.pop()?;
                let a = frame.stack.pop()?;
                if b == 0 {
                    return Err(JvmError::DivideByZero);
                }
                let result = if opcode == opcode::IDIV {
                    a.wrapping_div(b)
                } else {
                    a.wrapping_rem(b)
                };
                frame.stack.push(result)?;
                frame.pc += 1;
            }

            opcode::INEG => {
                let a = frame.stack.pop()?;
                frame.stack.push(a.wrapping_neg())?;
                frame.pc += 1;
            }

            opcode::ISHL | opcode::ISHR | opcode::IUSHR => {
                let b = frame.stack.pop()?;
                let a = frame.stack.pop()?;
                let shift = (b & 0x1f) as u32;
                let result = match opcode {
                    opcode::ISHL => a.wrapping_shl(shift),
                    opcode::ISHR => a.wrapping_shr(shift),
                    opcode::IUSHR => ((a as u32).wrapping_shr(shift)) as i32,
                    _ => unreachable!(),
                };
                frame.stack.push(result)?;
                frame.pc += 1;
            }

            opcode::IAND | opcode::IOR | opcode::IXOR => {
                let b = frame.stack.pop()?;
                let a = frame.stack.pop()?;
                let result = match opcode {
                    opcode::IAND => a & b,
                    opcode::IOR => a | b,
                    opcode::IXOR => a ^ b,
                    _ => unreachable!(),
                };
                frame.stack.push(result)?;
                frame.pc += 1;
            }

            opcode::DUP => {
                let top = frame.stack.top()?;
                frame.stack.push(top)?;
                frame.pc += 1;
            }

            opcode::IFEQ..=opcode::IFLE => {
                // Pop first, then branch on the captured value — the
                // stack-cursor discipline spec §9 asks for, rather than
                // decrementing after reading.
                let value = frame.stack.pop()?;
                let taken = match opcode {
                    opcode::IFEQ => value == 0,
                    opcode::IFNE => value != 0,
                    opcode::IFLT => value < 0,
                    opcode::IFGE => value >= 0,
                    opcode::IFGT => value > 0,
                    opcode::IFLE => value <= 0,
                    _ => unreachable!(),
                };
                branch_or_advance(&mut frame, taken)?;
            }

            opcode::IF_ICMPEQ..=opcode::IF_ICMPLE => {
                let b = frame.stack.pop()?;
                let a = frame.stack.pop()?;
                let taken = match opcode {
                    opcode::IF_ICMPEQ => a == b,
                    opcode::IF_ICMPNE => a != b,
                    opcode::IF_ICMPLT => a < b,
                    opcode::IF_ICMPGE => a >= b,
                    opcode::IF_ICMPGT => a > b,
                    opcode::IF_ICMPLE => a <= b,
                    _ => unreachable!(),
                };
                branch_or_advance(&mut frame, taken)?;
            }

            opcode::GOTO => {
                branch_or_advance(&mut frame, true)?;
            }

            opcode::IRETURN | opcode::ARETURN => {
                return Ok(Some(frame.stack.pop()?));
            }

            opcode::RETURN => {
                return Ok(None);
            }

            opcode::GETSTATIC => {
                // Treated as a push-nothing marker for the println idiom
                // (spec §4.3 "The println intrinsic" / §9).
                frame.pc += 3;
            }

            opcode::INVOKEVIRTUAL => {
                let value = frame.stack.pop()?;
                writeln!(stdout, "{}", value)?;
                frame.pc += 3;
            }

            opcode::INVOKESTATIC => {
                let cp_index = read_u16(frame.code, frame.pc + 1);
                let callee = class.find_method_from_index(cp_index)?;
                let callee_code = callee.code.as_ref().ok_or_else(|| {
                    JvmError::MethodNotFound(callee.name.clone(), callee.descriptor.clone())
                })?;
                let num_params = teeny_class_file::class_file::parameter_count(callee)? as usize;

                let mut callee_locals = vec![0i32; callee_code.max_locals as usize];
                for slot in (0..num_params).rev() {
                    callee_locals[slot] = frame.stack.pop()?;
                }

                log::debug!("invokestatic -> {}{}", callee.name, callee.descriptor);
                let result = execute(callee, callee_locals, class, heap, stdout)?;
                if let Some(v) = result {
                    frame.stack.push(v)?;
                }
                frame.pc += 3;
            }

            opcode::NEWARRAY => {
                let atype = frame.code[frame.pc + 1];
                if atype != opcode::T_INT {
                    return Err(JvmError::UnsupportedArrayType(atype));
                }
                let len = frame.stack.pop()?;
                let reference = heap.new_array(len)?;
                frame.stack.push(reference as i32)?;
                frame.pc += 2;
            }

            opcode::ARRAYLENGTH => {
                let reference = frame.stack.pop()? as usize;
                frame.stack.push(heap.length(reference)?)?;
                frame.pc += 1;
            }

            opcode::IALOAD => {
                let index = frame.stack.pop()?;
                let reference = frame.stack.pop()? as usize;
                frame.stack.push(heap.load(reference, index)?)?;
                frame.pc += 1;
            }

            opcode::IASTORE => {
                let value = frame.stack.pop()?;
                let index = frame.stack.pop()?;
                let reference = frame.stack.pop()? as usize;
                heap.store(reference, index, value)?;
                frame.pc += 1;
            }

            other => return Err(JvmError::UnknownOpcode(other)),
        }
    }
}

/// Reads the two-byte unsigned big-endian branch/pool-index operand at
/// `code[at..at+2]`.
fn read_u16(code: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([code[at], code[at + 1]])
}

/// Branches to `pc + signed16_offset` if `taken`, else advances past the
/// 3-byte instruction. The offset is read as two *unsigned* bytes combined
/// big-endian, then sign-extended as a 16-bit value — not `b1 as i16`
/// combined with `b2 as i8`, which mishandles low bytes above `0x7F` (spec
/// §9's resolved open question).
fn branch_or_advance(frame: &mut Frame, taken: bool) -> Result<()> {
    if taken {
        let offset = read_u16(frame.code, frame.pc + 1) as i16 as isize;
        let target = frame.pc as isize + offset;
        if target < 0 || target as usize >= frame.code.len() {
            return Err(JvmError::BadBranchTarget(target, frame.code.len()));
        }
        frame.pc = target as usize;
    } else {
        frame.pc += 3;
    }
    Ok(())
}

fn local_at(locals: &[i32], index: usize) -> Result<i32> {
    locals
        .get(index)
        .copied()
        .ok_or(JvmError::BadLocalIndex(index as u8))
}

fn local_at_mut(locals: &mut [i32], index: usize) -> Result<&mut i32> {
    locals
        .get_mut(index)
        .ok_or(JvmError::BadLocalIndex(index as u8))
}

fn store_local(locals: &mut [i32], index: usize, value: i32) -> Result<()> {
    *local_at_mut(locals, index)? = value;
    Ok(())
}
