use teeny_class_file::ClassFileError;
use thiserror::Error;

/// Runtime errors the interpreter can hit (spec §7's error taxonomy, minus
/// `UsageError`/`IoError`, which belong to the CLI layer).
///
/// Every variant here is fatal: nothing is retried or caught, and local
/// detection is local termination (the caller prints a diagnostic and
/// exits non-zero).
#[derive(Error, Debug)]
pub enum JvmError {
    #[error("malformed class file: {0}")]
    ClassFile(#[from] ClassFileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("method not found: {0}{1}")]
    MethodNotFound(String, String),

    #[error("main method must return void")]
    MainMustReturnVoid,

    #[error("division by zero")]
    DivideByZero,

    #[error("heap reference {0} out of range")]
    BadHeapRef(usize),

    #[error("array index {index} out of range for array of length {len}")]
    BadArrayIndex { index: i32, len: i32 },

    #[error("negative array length {0}")]
    NegativeArrayLength(i32),

    #[error("newarray only supports int arrays (atype 10), got atype {0}")]
    UnsupportedArrayType(u8),

    #[error("operand stack overflow (max_stack exceeded)")]
    StackOverflow,

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("local variable index {0} out of range")]
    BadLocalIndex(u8),

    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("branch target {0} out of range for code of length {1}")]
    BadBranchTarget(isize, usize),
}

pub type Result<T> = std::result::Result<T, JvmError>;
