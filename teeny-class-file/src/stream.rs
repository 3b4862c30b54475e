use std::io::Read;

use crate::error;

/// A utility wrapper to allow easily reading class file types from a
/// [Reader](std::io::Read), big-endian, tracking a byte cursor.
pub struct ClassFileStream<'a, R: Read>(pub &'a mut R, pub usize);

impl<'a, R: Read> ClassFileStream<'a, R> {
    /// Create a new stream from a reader.
    pub fn new(r: &'a mut R) -> Self {
        Self(r, 0)
    }

    /// Read an unsigned 4-byte integer from the stream.
    pub fn read_u4(&mut self) -> error::Result<u32> {
        Ok(u32::from_be_bytes(self.read::<4>()?))
    }

    /// Read an unsigned 2-byte integer from the stream.
    pub fn read_u2(&mut self) -> error::Result<u16> {
        Ok(u16::from_be_bytes(self.read::<2>()?))
    }

    /// Read an unsigned byte from the stream.
    pub fn read_u1(&mut self) -> error::Result<u8> {
        Ok(self.read::<1>()?[0])
    }

    /// Utility method to read `S` bytes from the stream.
    pub fn read<const S: usize>(&mut self) -> error::Result<[u8; S]> {
        let mut w = [0; S];
        self.0.read_exact(&mut w)?;
        self.1 += S;
        Ok(w)
    }

    /// Read `len` bytes from the stream, for runtime-length blobs (UTF-8
    /// payloads, bytecode arrays, ...).
    pub fn read_dynamic(&mut self, len: usize) -> error::Result<Vec<u8>> {
        let mut w = vec![0; len];
        self.0.read_exact(&mut w)?;
        self.1 += len;
        Ok(w)
    }

    /// Read and discard `len` bytes, for structures this core doesn't
    /// interpret but must still skip over to keep the cursor aligned
    /// (interfaces, fields, exception tables, attributes other than
    /// `Code`).
    pub fn skip(&mut self, len: usize) -> error::Result<()> {
        self.read_dynamic(len)?;
        Ok(())
    }
}
