//! Class file parser.
//!
//! Loads a `.class` file into an easily usable data structure: a constant
//! pool, a method table, and per-method `Code` attributes with raw bytecode.
//!
//! Only the constant-pool tags and attributes a single-class, integer-only
//! interpreter needs are materialized; everything else is consumed from the
//! stream (so the cursor stays aligned with real `javac` output) and
//! discarded.

pub mod class_file;
pub mod constant_pool;
pub mod error;
pub mod method;
pub mod stream;

pub use class_file::ClassFile;
pub use constant_pool::{ConstantPool, ConstantPoolEntry};
pub use error::{ClassFileError, Result};
pub use method::MethodInfo;
pub use stream::ClassFileStream;
