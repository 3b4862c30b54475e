use std::io::Read;

use crate::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::error::{self, ClassFileError};
use crate::method::{self, MethodInfo};
use crate::stream::ClassFileStream;

/// The magic number every class file starts with.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// A parsed class file: constant pool, method table, nothing else this
/// core needs to keep around (§3 "Class image").
///
/// Immutable and owned once parsed; internal strings and bytecode arrays
/// live for the `ClassFile`'s own lifetime.
#[derive(Debug)]
pub struct ClassFile {
    pub version: (u16, u16),
    pub constant_pool: ConstantPool,
    pub methods: Vec<MethodInfo>,
}

impl ClassFile {
    /// Parses a class file from a byte stream. Fails with
    /// [`ClassFileError`] if the stream ends prematurely or a required
    /// structure is malformed.
    pub fn parse<R: Read>(reader: &mut R) -> error::Result<Self> {
        let mut s = ClassFileStream::new(reader);

        let magic = s.read_u4()?;
        if magic != CLASS_MAGIC {
            return Err(ClassFileError::BadMagicNumber(magic));
        }

        let minor_version = s.read_u2()?;
        let major_version = s.read_u2()?;

        let constant_pool = ConstantPool::read_from_stream(&mut s)?;

        let _access_flags = s.read_u2()?;
        let _this_class = s.read_u2()?;
        let _super_class = s.read_u2()?;

        let interfaces_count = s.read_u2()?;
        s.skip(interfaces_count as usize * 2)?;

        let fields_count = s.read_u2()?;
        for _ in 0..fields_count {
            Self::skip_field(&mut s)?;
        }

        let methods_count = s.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(MethodInfo::read_from_stream(&mut s, &constant_pool)?);
        }

        // Class-level attributes (SourceFile, etc.): consumed, discarded.
        let attributes_count = s.read_u2()?;
        for _ in 0..attributes_count {
            let _name_index = s.read_u2()?;
            let length = s.read_u4()?;
            s.skip(length as usize)?;
        }

        Ok(Self {
            version: (major_version, minor_version),
            constant_pool,
            methods,
        })
    }

    /// `field_info` (JVMS §4.5) is never consulted by this core (no field
    /// access bytecodes) but must still be skipped byte-for-byte.
    fn skip_field<R: Read>(s: &mut ClassFileStream<R>) -> error::Result<()> {
        let _access_flags = s.read_u2()?;
        let _name_index = s.read_u2()?;
        let _descriptor_index = s.read_u2()?;
        let attributes_count = s.read_u2()?;
        for _ in 0..attributes_count {
            let _name_index = s.read_u2()?;
            let length = s.read_u4()?;
            s.skip(length as usize)?;
        }
        Ok(())
    }

    /// Finds the unique method with the given name and descriptor.
    pub fn find_method(&self, name: &str, descriptor: &str) -> error::Result<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
            .ok_or_else(|| ClassFileError::MethodNotFound(name.to_string(), descriptor.to_string()))
    }

    /// Resolves a `Methodref` constant pool index to its target method
    /// within this same class (this core supports single-class programs
    /// only, so the `Methodref`'s class_index is not separately resolved).
    pub fn find_method_from_index(&self, cp_index: u16) -> error::Result<&MethodInfo> {
        let (name, descriptor) = self.constant_pool.resolve_methodref(cp_index)?;
        self.find_method(&name, &descriptor)
    }

    /// Fetches an `Integer` constant pushed by `ldc`. Returns the stored
    /// value verbatim; the index is used as given (1-based), per spec §9's
    /// resolved "Open question" (not decremented, matching JVMS).
    pub fn get_integer_constant(&self, index: u16) -> error::Result<i32> {
        match self.constant_pool.get_constant(index)? {
            ConstantPoolEntry::Integer(v) => Ok(*v),
            _ => Err(ClassFileError::ExpectedInteger),
        }
    }
}

/// Parameter count of a method's descriptor, re-exported at the class-file
/// level for callers that only have a [`MethodInfo`] in hand.
pub fn parameter_count(method: &MethodInfo) -> error::Result<u16> {
    method::parameter_count(&method.descriptor)
}
