use std::io::Read;

use crate::error::{self, ClassFileError};
use crate::stream::ClassFileStream;

/// The tag values for each type of constant pool entry (JVMS §4.4).
mod tags {
    pub const CLASS: u8 = 7;
    pub const FIELDREF: u8 = 9;
    pub const METHODREF: u8 = 10;
    pub const INTERFACE_METHODREF: u8 = 11;
    pub const STRING: u8 = 8;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const UTF8: u8 = 1;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const INVOKE_DYNAMIC: u8 = 18;
}

/// A single constant pool entry.
///
/// Only the tags this core's operations touch (§3 "Constant pool": Utf8,
/// Integer, Class, NameAndType, Methodref/Fieldref) are materialized into
/// their own variants. Every other tag `javac` can legally emit is still
/// decoded byte-for-byte so the stream cursor stays aligned, but its
/// payload is thrown away into `Other`.
#[derive(Debug, Clone)]
pub enum ConstantPoolEntry {
    /// `CONSTANT_Utf8_info`: a length-prefixed UTF-8 string.
    Utf8(String),
    /// `CONSTANT_Integer_info`: a 32-bit signed constant.
    Integer(i32),
    /// `CONSTANT_Class_info`: a name-index into the pool. Not interpreted
    /// beyond pass-through by this core.
    Class { name_index: u16 },
    /// `CONSTANT_NameAndType_info`: a (name, descriptor) index pair.
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    /// `CONSTANT_Methodref_info`: a (class, name-and-type) index pair.
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    /// `CONSTANT_Fieldref_info`: a (class, name-and-type) index pair.
    /// This core never reads the field itself but must still decode the
    /// entry to keep indices aligned.
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    /// A decoded-but-unused entry (Float, Long, Double, String,
    /// InterfaceMethodref, MethodHandle, MethodType, InvokeDynamic).
    Other,
    /// The unusable slot immediately following a `Long`/`Double` entry
    /// (JVMS §4.4.5: such entries occupy two constant pool indices).
    Unusable,
}

impl ConstantPoolEntry {
    fn read_one<R: Read>(s: &mut ClassFileStream<R>) -> error::Result<(Self, bool)> {
        use tags::*;
        let entry = match s.read_u1()? {
            UTF8 => {
                let length = s.read_u2()?;
                let bytes = s.read_dynamic(length as usize)?;
                Self::Utf8(String::from_utf8(bytes).map_err(ClassFileError::InvalidUtf8Error)?)
            }
            INTEGER => Self::Integer(s.read_u4()? as i32),
            CLASS => Self::Class {
                name_index: s.read_u2()?,
            },
            NAME_AND_TYPE => Self::NameAndType {
                name_index: s.read_u2()?,
                descriptor_index: s.read_u2()?,
            },
            METHODREF => Self::Methodref {
                class_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            },
            FIELDREF => Self::Fieldref {
                class_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            },
            INTERFACE_METHODREF => {
                s.skip(4)?;
                Self::Other
            }
            STRING => {
                s.skip(2)?;
                Self::Other
            }
            FLOAT => {
                s.skip(4)?;
                Self::Other
            }
            METHOD_HANDLE => {
                s.skip(3)?;
                Self::Other
            }
            METHOD_TYPE => {
                s.skip(2)?;
                Self::Other
            }
            INVOKE_DYNAMIC => {
                s.skip(4)?;
                Self::Other
            }
            LONG => {
                s.skip(8)?;
                return Ok((Self::Other, true));
            }
            DOUBLE => {
                s.skip(8)?;
                return Ok((Self::Other, true));
            }
            v => return Err(ClassFileError::UnknownConstantPoolTag(v)),
        };
        Ok((entry, false))
    }
}

/// The constant pool. Contains all constant pool entries, 1-indexed per
/// JVMS §4.4 (index 0 is reserved and unused).
#[derive(Debug)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    pub fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>) -> error::Result<Self> {
        let count = s.read_u2()?;
        // entries[0] is the unused reserved slot at index 0.
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(ConstantPoolEntry::Unusable);
        while entries.len() < count as usize {
            let (entry, takes_two_slots) = ConstantPoolEntry::read_one(s)?;
            entries.push(entry);
            if takes_two_slots {
                entries.push(ConstantPoolEntry::Unusable);
            }
        }
        Ok(Self { entries })
    }

    /// Get a constant from the pool. `index` is 1-based, as in the class
    /// file format.
    pub fn get_constant(&self, index: u16) -> error::Result<&ConstantPoolEntry> {
        self.entries
            .get(index as usize)
            .ok_or(ClassFileError::BadConstantPoolIndex(index))
    }

    /// Get a UTF-8 constant from the pool.
    pub fn get_utf8(&self, index: u16) -> error::Result<&str> {
        match self.get_constant(index)? {
            ConstantPoolEntry::Utf8(data) => Ok(data),
            _ => Err(ClassFileError::ExpectedUtf8),
        }
    }

    /// Get an Integer constant from the pool.
    pub fn get_integer(&self, index: u16) -> error::Result<i32> {
        match self.get_constant(index)? {
            ConstantPoolEntry::Integer(v) => Ok(*v),
            _ => Err(ClassFileError::ExpectedInteger),
        }
    }

    /// Resolve a `Methodref` entry's pool index to its (name, descriptor),
    /// both as owned strings.
    pub fn resolve_methodref(&self, index: u16) -> error::Result<(String, String)> {
        let (_class_index, name_and_type_index) = match self.get_constant(index)? {
            ConstantPoolEntry::Methodref {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => return Err(ClassFileError::BadConstantPoolIndex(index)),
        };
        match self.get_constant(name_and_type_index)? {
            ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((
                self.get_utf8(*name_index)?.to_string(),
                self.get_utf8(*descriptor_index)?.to_string(),
            )),
            _ => Err(ClassFileError::BadConstantPoolIndex(name_and_type_index)),
        }
    }
}
