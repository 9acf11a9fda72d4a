//! The shared capability surface implemented by every stream adapter.
//!
//! All adapters in this crate are in-memory views: no operation blocks, and a
//! read that returns `0` means the current position is at or past the logical
//! end, never "try again later". Capability flags report what an instance can
//! do right now; they all drop to `false` once the stream is closed.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, StreamError};

/// Origin for [`ByteStream::seek`].
///
/// Mirrors the usual three-origin seek contract. A fourth origin is
/// unrepresentable, so "unknown seek origin" is not an error this crate can
/// produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    /// Absolute offset from the start of the stream.
    Start(u64),
    /// Signed offset from the current position.
    Current(i64),
    /// Signed offset from the logical end of the stream.
    End(i64),
}

/// Uniform read/seek/write contract over an in-memory byte representation.
///
/// Implementors own private cursor state and are not safe for concurrent use
/// from multiple threads; `&mut self` receivers make that a compile-time rule
/// rather than documentation.
pub trait ByteStream {
    /// Whether the stream can currently serve reads.
    fn can_read(&self) -> bool;

    /// Whether the stream can currently serve seeks.
    fn can_seek(&self) -> bool;

    /// Whether the stream can currently serve writes.
    fn can_write(&self) -> bool;

    /// Whether the stream is still open. All I/O fails with
    /// [`StreamError::Closed`] once this is `false`.
    fn is_open(&self) -> bool;

    /// Total length of the stream in bytes.
    ///
    /// O(1) for buffer- and segment-backed streams. For
    /// [`EncodedTextStream`](crate::EncodedTextStream) the first call runs a
    /// full encoding pass and caches the result; see that type's docs.
    fn len(&mut self) -> Result<u64>;

    /// Current absolute byte offset.
    fn position(&self) -> Result<u64>;

    /// Sets the absolute byte offset. Equivalent to `seek(SeekFrom::Start(pos))`.
    fn set_position(&mut self, pos: u64) -> Result<()>;

    /// Reads into `buf`, returning how many bytes were copied.
    ///
    /// Never blocks. Returns `0` if and only if the current position is at or
    /// past the logical end of the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Flushes the stream. All adapters here hold no externally visible
    /// write-behind state, so this is a validated no-op: it succeeds while
    /// the stream is open and fails with [`StreamError::Closed`] after.
    fn flush(&mut self) -> Result<()>;

    /// Closes the stream. Idempotent. Subsequent I/O fails with
    /// [`StreamError::Closed`]; see [`try_underlying_buffer`] for the one
    /// accessor that intentionally survives closing.
    ///
    /// [`try_underlying_buffer`]: ByteStream::try_underlying_buffer
    fn close(&mut self);

    /// Moves the cursor relative to `origin` and returns the new absolute
    /// position.
    ///
    /// The target is validated before any state changes: a resolution below
    /// zero fails with [`StreamError::InvalidSeek`] and leaves the position
    /// untouched. Seeking past the logical end is accepted; reads there
    /// return `0`.
    fn seek(&mut self, origin: SeekFrom) -> Result<u64> {
        let target = match origin {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position()?) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.len()?) + i128::from(delta),
        };
        let target = u64::try_from(target).map_err(|_| StreamError::InvalidSeek)?;
        self.set_position(target)?;
        Ok(target)
    }

    /// Writes `buf` at the current position, returning how many bytes were
    /// accepted. Read-only adapters fail with [`StreamError::Unsupported`].
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let _ = buf;
        Err(StreamError::Unsupported("stream does not support writing"))
    }

    /// Changes the logical length. No adapter in this crate has resizable
    /// backing storage, so this fails with [`StreamError::Unsupported`].
    fn set_len(&mut self, len: u64) -> Result<()> {
        let _ = len;
        Err(StreamError::Unsupported("stream has a fixed length"))
    }

    /// [`flush`](ByteStream::flush) honoring an already-requested
    /// cancellation signal.
    ///
    /// The signal is checked synchronously before anything else: if it is set
    /// the call reports [`StreamError::Cancelled`] and performs no work.
    /// There is no deferred work to cancel afterwards.
    fn flush_cancellable(&mut self, cancelled: &AtomicBool) -> Result<()> {
        if cancelled.load(Ordering::Relaxed) {
            return Err(StreamError::Cancelled);
        }
        self.flush()
    }

    /// Exposes the raw backing memory, if this instance was constructed as
    /// publicly visible.
    ///
    /// Only meaningful for the buffer-backed adapters; the default is `None`.
    /// This accessor keeps working after [`close`](ByteStream::close):
    /// closing revokes I/O, not the validity of caller-owned memory.
    fn try_underlying_buffer(&self) -> Option<&[u8]> {
        None
    }

    /// Reads from the current position to the logical end, appending to
    /// `out`. Returns the number of bytes appended.
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let mut scratch = [0u8; 512];
        let mut total = 0;
        loop {
            let n = self.read(&mut scratch)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&scratch[..n]);
            total += n;
        }
    }
}
