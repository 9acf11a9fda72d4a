//! Bounds-checked read/write cursor over a fixed-capacity buffer.

use alloc::{boxed::Box, vec, vec::Vec};
use core::cmp::min;
use core::fmt;

use bstr::BStr;

use crate::{
    error::{Result, StreamError},
    stream::ByteStream,
};

/// Read/write cursor over a single contiguous buffer whose capacity is fixed
/// at construction.
///
/// The logical length is a high-water mark distinct from the physical
/// capacity: it grows only through writes, never through `set_len`. A write
/// that would run past the capacity fails whole with
/// [`StreamError::Unsupported`] and copies nothing, so the logical length is
/// unchanged by a rejected call.
///
/// Closing the stream revokes I/O but deliberately preserves the underlying
/// memory: [`try_underlying_buffer`](ByteStream::try_underlying_buffer)
/// keeps returning the logical content afterwards when the stream was
/// constructed publicly visible.
pub struct FixedBufferStream {
    buf: Box<[u8]>,
    /// High-water mark: bytes `[0, len)` have been written.
    len: usize,
    pos: u64,
    open: bool,
    writable: bool,
    visible: bool,
}

impl FixedBufferStream {
    /// Creates an empty stream with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            len: 0,
            pos: 0,
            open: true,
            writable: true,
            visible: true,
        }
    }

    /// Creates a stream over caller-supplied contents. The capacity equals
    /// the supplied length, so the logical length can no longer grow; writes
    /// may still overwrite existing bytes in place.
    #[must_use]
    pub fn from_vec(buf: Vec<u8>) -> Self {
        let buf = buf.into_boxed_slice();
        Self {
            len: buf.len(),
            buf,
            pos: 0,
            open: true,
            writable: true,
            visible: true,
        }
    }

    /// Controls whether [`ByteStream::try_underlying_buffer`] exposes the
    /// backing memory. Streams are publicly visible by default.
    #[must_use]
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Physical capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(StreamError::Closed) }
    }
}

impl ByteStream for FixedBufferStream {
    fn can_read(&self) -> bool {
        self.open
    }

    fn can_seek(&self) -> bool {
        self.open
    }

    fn can_write(&self) -> bool {
        self.open && self.writable
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn len(&mut self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.len as u64)
    }

    fn position(&self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.pos)
    }

    fn set_position(&mut self, pos: u64) -> Result<()> {
        self.ensure_open()?;
        self.pos = pos;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        if self.pos >= self.len as u64 {
            return Ok(0);
        }
        let pos = self.pos as usize;
        let n = min(self.len - pos, buf.len());
        buf[..n].copy_from_slice(&self.buf[pos..pos + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        if !self.writable {
            return Err(StreamError::Unsupported("stream is not writable"));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        let pos = usize::try_from(self.pos)
            .ok()
            .filter(|p| p.checked_add(buf.len()).is_some_and(|end| end <= self.buf.len()))
            .ok_or(StreamError::Unsupported("write would exceed fixed capacity"))?;
        let end = pos + buf.len();
        // Seeking past the high-water mark then writing leaves a gap; it
        // reads back as zeroes.
        if pos > self.len {
            self.buf[self.len..pos].fill(0);
        }
        self.buf[pos..end].copy_from_slice(buf);
        self.pos = end as u64;
        if end > self.len {
            self.len = end;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&mut self) {
        self.open = false;
        self.writable = false;
    }

    fn try_underlying_buffer(&self) -> Option<&[u8]> {
        self.visible.then(|| &self.buf[..self.len])
    }
}

impl fmt::Debug for FixedBufferStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBufferStream")
            .field("content", &BStr::new(&self.buf[..self.len]))
            .field("capacity", &self.buf.len())
            .field("pos", &self.pos)
            .field("open", &self.open)
            .finish()
    }
}
