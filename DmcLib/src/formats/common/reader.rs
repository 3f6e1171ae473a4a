//! Positioned little-endian reader over an in-memory byte buffer
//!
//! Every read checks the remaining length first so that a short stream
//! reports [`Error::TruncatedInput`] with the offending offset instead of a
//! bare IO error.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

/// Seekable reader producing typed primitives from a borrowed buffer.
///
/// The reader never owns the data, so independent decoders can each hold
/// their own reader over the same file buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    /// Create a reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Create a reader positioned at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOffset`] if `offset` is negative.
    pub fn at(data: &'a [u8], offset: i64) -> Result<Self> {
        let mut reader = Self::new(data);
        reader.seek_offset(offset)?;
        Ok(reader)
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current stream position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Bytes left between the current position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        (self.len() as u64).saturating_sub(self.position()) as usize
    }

    /// Move to an absolute position. Seeking past the end is allowed; the
    /// next read reports the truncation.
    pub fn seek(&mut self, position: u64) {
        self.cursor.set_position(position);
    }

    /// Move to a signed absolute position as stored in file offset fields.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOffset`] if `offset` is negative.
    pub fn seek_offset(&mut self, offset: i64) -> Result<()> {
        if offset < 0 {
            return Err(Error::InvalidOffset { offset });
        }
        self.seek(offset as u64);
        Ok(())
    }

    /// Move relative to the current position.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOffset`] if the target would be negative.
    pub fn skip(&mut self, delta: i64) -> Result<()> {
        let target = self.position() as i64 + delta;
        self.seek_offset(target)
    }

    /// Check that `expected` bytes can be read from a position inside the
    /// buffer. A position past the end fails even for zero-length reads.
    fn ensure(&self, expected: usize) -> Result<()> {
        let available = self.remaining();
        if available < expected || self.position() > self.len() as u64 {
            return Err(Error::TruncatedInput {
                offset: self.position(),
                expected,
                available,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.cursor.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.cursor.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.cursor.read_i32::<LittleEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.cursor.read_u64::<LittleEndian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.cursor.read_i64::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    /// Read three consecutive `f32` values.
    pub fn read_vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read exactly `N` raw bytes.
    pub fn read_tag<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let start = self.position() as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.cursor.get_ref()[start..start + N]);
        self.seek((start + N) as u64);
        Ok(out)
    }

    /// Read a fixed-length string of `len` bytes. Invalid UTF-8 is replaced.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        self.ensure(len)?;
        let start = self.position() as usize;
        let bytes = &self.cursor.get_ref()[start..start + len];
        let text = String::from_utf8_lossy(bytes).into_owned();
        self.seek((start + len) as u64);
        Ok(text)
    }

    /// Read a null-terminated string and consume its terminator.
    ///
    /// # Errors
    /// Returns [`Error::UnterminatedString`] if no terminator is found
    /// before the end of the buffer.
    pub fn read_cstring(&mut self) -> Result<String> {
        let offset = self.position();
        let data = self.cursor.get_ref();
        let start = (offset as usize).min(data.len());
        let len = data[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnterminatedString { offset })?;
        let text = String::from_utf8_lossy(&data[start..start + len]).into_owned();
        self.seek((start + len + 1) as u64);
        Ok(text)
    }
}
