//! In-memory, byte-oriented stream adapters.
//!
//! Every adapter exposes the same [`ByteStream`] contract over a different
//! underlying representation:
//!
//! - [`FixedBufferStream`] — bounds-checked read/write cursor over a single
//!   fixed-capacity buffer with a high-water logical length.
//! - [`ReadOnlyBufferStream`] — read-only cursor over an immutable buffer.
//! - [`EncodedTextStream`] — read-only stream that encodes a text source to
//!   bytes lazily, in bounded chunks, with an O(n) resynchronization path
//!   that makes arbitrary seeks correct over variable-width encodings.
//! - [`SegmentedByteStream`] — read-only, seekable stream presenting a
//!   sequence of discontiguous byte segments as one logical range.
//!
//! All data already resides in memory: no operation blocks, and `read`
//! returns `0` exactly when the position is at or past the logical end.
//! Instances own private cursor state and require external synchronization
//! for any cross-thread use.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod fixed;
mod readonly;
mod segmented;
mod stream;
mod text;


pub use encoding_rs::Encoding;
pub use error::{Result, StreamError};
pub use fixed::FixedBufferStream;
pub use readonly::ReadOnlyBufferStream;
pub use segmented::SegmentedByteStream;
pub use stream::{ByteStream, SeekFrom};
pub use text::EncodedTextStream;
