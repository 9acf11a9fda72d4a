//! Read-only cursor over an immutable byte buffer.

use alloc::borrow::Cow;
use core::cmp::min;
use core::fmt;

use bstr::BStr;

use crate::{
    error::{Result, StreamError},
    stream::ByteStream,
};

/// Read-only specialization of the buffer cursor.
///
/// The content can neither grow nor shrink, so the length is always the full
/// buffer size; there is no separate high-water mark.
pub struct ReadOnlyBufferStream<'a> {
    data: Cow<'a, [u8]>,
    pos: u64,
    open: bool,
    visible: bool,
}

impl<'a> ReadOnlyBufferStream<'a> {
    /// Creates a stream over borrowed or owned bytes.
    pub fn new(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            open: true,
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

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(StreamError::Closed) }
    }
}

impl ByteStream for ReadOnlyBufferStream<'_> {
    fn can_read(&self) -> bool {
        self.open
    }

    fn can_seek(&self) -> bool {
        self.open
    }

    fn can_write(&self) -> bool {
        false
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn len(&mut self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.data.len() as u64)
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
        if self.pos >= self.data.len() as u64 {
            return Ok(0);
        }
        let pos = self.pos as usize;
        let n = min(self.data.len() - pos, buf.len());
        buf[..n].copy_from_slice(&self.data[pos..pos + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn try_underlying_buffer(&self) -> Option<&[u8]> {
        self.visible.then_some(&self.data[..])
    }
}

impl fmt::Debug for ReadOnlyBufferStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyBufferStream")
            .field("content", &BStr::new(&self.data[..]))
            .field("pos", &self.pos)
            .field("open", &self.open)
            .finish()
    }
}
