/// Big-endian byte reader
///
/// Cursor over a borrowed byte region. All ITCH wire integers are network
/// order; reads go through byteorder so the swap happens only on
/// little-endian hosts. No allocation, no copying beyond the value read.

use byteorder::{BigEndian, ByteOrder};

use crate::parser::DecodeError;

pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn check(&self, need: usize) -> Result<(), DecodeError> {
        if self.remaining() < need {
            return Err(DecodeError::TruncatedBuffer {
                offset: self.pos,
                need,
                have: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advance past `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.check(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.check(2)?;
        let v = BigEndian::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.check(4)?;
        let v = BigEndian::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.check(8)?;
        let v = BigEndian::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(v)
    }

    /// Copy `N` bytes verbatim (ASCII fields keep their space padding).
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// 48-bit nanoseconds-since-midnight timestamp: 16-bit high half followed
    /// by 32-bit low half, both big-endian.
    pub fn read_timestamp(&mut self) -> Result<u64, DecodeError> {
        let high = self.read_u16()?;
        let low = self.read_u32()?;
        Ok(((high as u64) << 32) | low as u64)
    }
}
