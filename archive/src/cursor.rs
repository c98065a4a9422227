use byteorder::{ByteOrder, LittleEndian};

use crate::error::DecodeError;

/// Sequential reader over an immutable byte buffer. All multi-byte values are
/// little-endian. Reads past the end of the buffer fail with
/// `TruncatedInput` carrying the offset where the shortfall happened.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn advance(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::TruncatedInput {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.advance(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.advance(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.advance(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(LittleEndian::read_i32(self.advance(4)?))
    }

    /// Reads `count` consecutive f32 values in a single pass over the buffer.
    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, DecodeError> {
        let bytes = self.advance(count * 4)?;
        let mut values = vec![0f32; count];
        LittleEndian::read_f32_into(bytes, &mut values);
        Ok(values)
    }

    /// Hands out the next `len` raw bytes without decoding them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.advance(len)
    }
}
