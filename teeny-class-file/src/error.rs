use std::string::FromUtf8Error;

/// An error which can occur on deserialization of a class file.
#[derive(Debug)]
pub enum ClassFileError {
    /// A generic I/O error, including premature end of stream.
    IoError(std::io::Error),

    /// Returned when a class file has a bad magic number.
    BadMagicNumber(u32),

    /// Returned when an unknown constant pool tag is found.
    UnknownConstantPoolTag(u8),

    /// Returned when invalid UTF-8 is found in a `Utf8` constant.
    InvalidUtf8Error(FromUtf8Error),

    /// Returned when bad class access flags are found.
    BadClassAccessFlags,

    /// Returned when a pool entry was expected to be a `Utf8` entry but
    /// wasn't.
    ExpectedUtf8,

    /// Returned when a pool entry was expected to be an `Integer` entry but
    /// wasn't.
    ExpectedInteger,

    /// Returned when a constant pool index is out of range.
    BadConstantPoolIndex(u16),

    /// Returned when a method descriptor is malformed.
    BadMethodDescriptor(String),

    /// Returned when no method matches a requested (name, descriptor) pair.
    MethodNotFound(String, String),
}

impl std::fmt::Display for ClassFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ClassFileError {}

impl From<std::io::Error> for ClassFileError {
    fn from(value: std::io::Error) -> Self {
        ClassFileError::IoError(value)
    }
}

pub type Result<T> = std::result::Result<T, ClassFileError>;
