//! Byte region with an explicit cursor and a settable byte order
//!
//! All codec primitives take a `&mut Region<S>` and advance its cursor. The
//! stream is anything seekable: `std::io::Cursor` over a slice, a `Vec`, or a
//! memory-mapped file. Opening, mapping and closing the storage stays with
//! the caller.

use crate::error::{Result, TimeseriesError};
use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, SeekFrom, Write};

const ZEROS: [u8; 64] = [0; 64];

/// A seekable byte stream paired with the byte order used for multi-byte fields
#[derive(Debug)]
pub struct Region<S> {
    stream: S,
    endian: Endian,
}

impl<S> Region<S> {
    /// Wrap a stream using big-endian byte order
    pub fn new(stream: S) -> Self {
        Self::with_endian(stream, Endian::Big)
    }

    /// Wrap a stream using the given byte order
    pub fn with_endian(stream: S, endian: Endian) -> Self {
        Self { stream, endian }
    }

    /// Byte order currently applied to multi-byte fields
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Replace the byte order
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Switch to the opposite byte order and return it
    pub fn flip_endian(&mut self) -> Endian {
        self.endian = match self.endian {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        };
        self.endian
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Seek> Region<S> {
    /// Current cursor position
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream.stream_position()?)
    }

    /// Move the cursor to an absolute position
    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        self.stream.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Advance the cursor without touching the skipped bytes
    pub fn skip(&mut self, bytes: u64) -> Result<()> {
        let delta = i64::try_from(bytes).map_err(|_| TimeseriesError::Truncated {
            expected: bytes,
            available: i64::MAX as u64,
        })?;
        self.stream.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    /// Bytes between the cursor and the end of the stream
    pub fn remaining(&mut self) -> Result<u64> {
        let position = self.stream.stream_position()?;
        let end = self.stream.seek(SeekFrom::End(0))?;
        self.stream.seek(SeekFrom::Start(position))?;
        Ok(end.saturating_sub(position))
    }

    /// Fail with `Truncated` unless `bytes` are left after the cursor
    pub fn ensure_available(&mut self, bytes: u64) -> Result<()> {
        let available = self.remaining()?;
        if available < bytes {
            return Err(TimeseriesError::Truncated {
                expected: bytes,
                available,
            });
        }
        Ok(())
    }

    /// Run `op` and verify it moved the cursor by exactly `declared` bytes
    pub fn framed<T>(
        &mut self,
        declared: u64,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let start = self.position()?;
        let value = op(self)?;
        let end = self.position()?;
        let expected = start + declared;
        if end != expected {
            return Err(TimeseriesError::FramingFault {
                expected,
                actual: end,
            });
        }
        Ok(value)
    }
}

impl<S: Read + Seek> Region<S> {
    /// Read one fixed-width value in the current byte order
    pub fn get<T>(&mut self) -> Result<T>
    where
        T: for<'a> BinRead<Args<'a> = ()>,
    {
        Ok(T::read_options(&mut self.stream, self.endian, ())?)
    }

    /// Read `len` raw bytes
    pub fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.stream.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl<S: Write + Seek> Region<S> {
    /// Write one fixed-width value in the current byte order
    pub fn put<T>(&mut self, value: &T) -> Result<()>
    where
        T: for<'a> BinWrite<Args<'a> = ()>,
    {
        value.write_options(&mut self.stream, self.endian, ())?;
        Ok(())
    }

    /// Write `len` zero bytes
    pub fn put_zeros(&mut self, mut len: usize) -> Result<()> {
        while len > 0 {
            let chunk = len.min(ZEROS.len());
            self.stream.write_all(&ZEROS[..chunk])?;
            len -= chunk;
        }
        Ok(())
    }
}
