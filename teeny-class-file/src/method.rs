use std::io::Read;

use crate::constant_pool::ConstantPool;
use crate::error::{self, ClassFileError};
use crate::stream::ClassFileStream;

bitflags::bitflags! {
    /// Method access flags (JVMS §4.6). Not interpreted by this core beyond
    /// being decoded so the stream stays aligned.
    pub struct MethodAccessFlags: u16 {
        const ACC_PUBLIC = 0x0001;
        const ACC_PRIVATE = 0x0002;
        const ACC_PROTECTED = 0x0004;
        const ACC_STATIC = 0x0008;
        const ACC_FINAL = 0x0010;
        const ACC_SYNCHRONIZED = 0x0020;
        const ACC_BRIDGE = 0x0040;
        const ACC_VARARGS = 0x0080;
        const ACC_NATIVE = 0x0100;
        const ACC_ABSTRACT = 0x0400;
        const ACC_STRICT = 0x0800;
        const ACC_SYNTHETIC = 0x1000;
    }
}

/// A method's `Code` attribute: operand-stack bound, locals bound, and the
/// raw bytecode array (§3 "Operand stack" / "Locals").
#[derive(Debug, Clone)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

/// A single method_info structure, resolved down to what this core needs:
/// name, descriptor, and (if present) its `Code` attribute.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub code: Option<Code>,
}

impl MethodInfo {
    pub fn read_from_stream<R: Read>(
        s: &mut ClassFileStream<R>,
        cp: &ConstantPool,
    ) -> error::Result<Self> {
        let access_flags =
            MethodAccessFlags::from_bits(s.read_u2()?).ok_or(ClassFileError::BadClassAccessFlags)?;
        let name = cp.get_utf8(s.read_u2()?)?.to_string();
        let descriptor = cp.get_utf8(s.read_u2()?)?.to_string();

        let attributes_count = s.read_u2()?;
        let mut code = None;
        for _ in 0..attributes_count {
            let name_index = s.read_u2()?;
            let attribute_length = s.read_u4()?;
            let attribute_name = cp.get_utf8(name_index)?;
            if attribute_name == "Code" {
                code = Some(Self::read_code_attribute(s)?);
            } else {
                s.skip(attribute_length as usize)?;
            }
        }

        Ok(Self {
            access_flags,
            name,
            descriptor,
            code,
        })
    }

    /// Reads a `Code` attribute per JVMS §4.7.3: `max_stack`, `max_locals`,
    /// the bytecode array, then an exception table and nested attributes
    /// that this core consumes but never interprets (no exception
    /// handling, per spec Non-goals).
    fn read_code_attribute<R: Read>(s: &mut ClassFileStream<R>) -> error::Result<Code> {
        let max_stack = s.read_u2()?;
        let max_locals = s.read_u2()?;
        let code_length = s.read_u4()?;
        let code = s.read_dynamic(code_length as usize)?;

        let exception_table_length = s.read_u2()?;
        // Each exception_table entry is start_pc, end_pc, handler_pc,
        // catch_type: four u16s.
        s.skip(exception_table_length as usize * 8)?;

        let attributes_count = s.read_u2()?;
        for _ in 0..attributes_count {
            let _name_index = s.read_u2()?;
            let length = s.read_u4()?;
            s.skip(length as usize)?;
        }

        Ok(Code {
            max_stack,
            max_locals,
            code,
        })
    }
}

/// Counts the top-level parameter tokens in a method descriptor
/// `(T1T2...Tn)R`. A token is a single primitive letter among
/// `{B,C,S,I,Z,F,J,D}`, an `L<classname>;` reference type, or any number of
/// leading `[` (array dimensions) followed by another token.
pub fn parameter_count(descriptor: &str) -> error::Result<u16> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(ClassFileError::BadMethodDescriptor(descriptor.to_string()));
    }

    let mut i = 1;
    let mut count: u16 = 0;
    while i < bytes.len() && bytes[i] != b')' {
        while i < bytes.len() && bytes[i] == b'[' {
            i += 1;
        }
        match bytes.get(i) {
            Some(b'B' | b'C' | b'S' | b'I' | b'Z' | b'F' | b'J' | b'D') => i += 1,
            Some(b'L') => {
                while i < bytes.len() && bytes[i] != b';' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ClassFileError::BadMethodDescriptor(descriptor.to_string()));
                }
                i += 1;
            }
            _ => return Err(ClassFileError::BadMethodDescriptor(descriptor.to_string())),
        }
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::parameter_count;

    #[test]
    fn no_params() {
        assert_eq!(parameter_count("()V").unwrap(), 0);
    }

    #[test]
    fn int_params() {
        assert_eq!(parameter_count("(II)I").unwrap(), 2);
    }

    #[test]
    fn main_signature() {
        assert_eq!(parameter_count("([Ljava/lang/String;)V").unwrap(), 1);
    }

    #[test]
    fn mixed_params() {
        assert_eq!(parameter_count("(I[ILjava/lang/Object;)V").unwrap(), 3);
    }

    #[test]
    fn bad_descriptor() {
        assert!(parameter_count("II)V").is_err());
    }
}
