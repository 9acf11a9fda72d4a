//! Read-only byte stream produced by encoding a text source on the fly.
//!
//! The source text is never materialized as bytes up front. Reads pull from a
//! bounded scratch chunk that is refilled by handing the encoder the
//! remaining source with a capped output buffer, so memory stays bounded and
//! the encoder's partial state (pending multi-byte units, shift sequences)
//! carries across chunk boundaries. Trailing encoder state is finalized
//! exactly once, when the input is exhausted, never mid-stream.
//!
//! Seeking is accepted for any non-negative offset but text encodings are
//! variable-width: an arbitrary byte offset cannot be mapped back to a char
//! offset without re-deriving encoder state from the beginning. Setting the
//! position therefore only marks the stream desynchronized; the next read
//! replays the encode from the start, discarding whole chunks while the
//! cumulative byte count stays at or below the target and stopping inside the
//! chunk that straddles it. That replay is O(n) in the source length, as is
//! the first `len` call, so callers should avoid seeking or asking for the
//! length in hot paths. Deferring the replay keeps `set_position` itself
//! O(1).

use alloc::{borrow::Cow, vec, vec::Vec};
use core::cmp::min;
use core::fmt;

use encoding_rs::{CoderResult, Encoder, Encoding};

use crate::{
    error::{Result, StreamError},
    stream::ByteStream,
};

/// Default scratch chunk capacity in bytes.
const DEFAULT_CHUNK_CAPACITY: usize = 1024;

/// Smallest chunk the encoder is guaranteed to make progress into. The worst
/// single-char output is a numeric character reference plus shift sequences.
const MIN_CHUNK_CAPACITY: usize = 32;

/// Read-only, seekable stream over the encoded bytes of a text source.
///
/// The source is borrowed or owned for the stream's lifetime and treated as
/// immutable; the cached result of [`len`](ByteStream::len) relies on that
/// and is computed at most once.
pub struct EncodedTextStream<'a> {
    source: Cow<'a, str>,
    encoding: &'static Encoding,
    encoder: Encoder,
    /// Byte offset into `source` (always a char boundary) encoded so far.
    src_pos: usize,
    /// Trailing encoder state has been finalized.
    flushed: bool,
    /// Most recently encoded chunk and how much of it was delivered.
    chunk: Vec<u8>,
    chunk_pos: usize,
    chunk_capacity: usize,
    /// Externally observable absolute byte offset.
    position: u64,
    /// Position was set since the last read; the next read resynchronizes.
    needs_resync: bool,
    cached_len: Option<u64>,
    open: bool,
}

impl<'a> EncodedTextStream<'a> {
    /// Creates a stream over `source` encoded with `encoding`.
    pub fn new(source: impl Into<Cow<'a, str>>, encoding: &'static Encoding) -> Self {
        Self::build(source.into(), encoding, DEFAULT_CHUNK_CAPACITY)
    }

    /// Creates a stream with an explicit scratch chunk capacity in bytes.
    ///
    /// Capacities below a small floor are raised to it so the encoder can
    /// always make progress on at least one character.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidArgument`] if `capacity` is zero.
    pub fn with_chunk_capacity(
        source: impl Into<Cow<'a, str>>,
        encoding: &'static Encoding,
        capacity: usize,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(StreamError::InvalidArgument(
                "chunk capacity must be non-zero",
            ));
        }
        Ok(Self::build(
            source.into(),
            encoding,
            capacity.max(MIN_CHUNK_CAPACITY),
        ))
    }

    fn build(source: Cow<'a, str>, encoding: &'static Encoding, chunk_capacity: usize) -> Self {
        Self {
            source,
            encoding,
            encoder: encoding.new_encoder(),
            src_pos: 0,
            flushed: false,
            chunk: Vec::with_capacity(chunk_capacity),
            chunk_pos: 0,
            chunk_capacity,
            position: 0,
            needs_resync: false,
            cached_len: None,
            open: true,
        }
    }

    /// The encoding this stream produces.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(StreamError::Closed) }
    }

    /// Encodes the next chunk into the scratch buffer. Returns `false` when
    /// the source is exhausted and trailing state has been flushed.
    ///
    /// The encoder always sees the full remaining source with `last = true`
    /// and a bounded output buffer: it consumes what fits per call and
    /// finalizes trailing state on the call that drains the input, so the
    /// flush happens exactly once, at the true end.
    fn refill(&mut self) -> bool {
        loop {
            self.chunk.clear();
            self.chunk_pos = 0;
            if self.flushed {
                return false;
            }
            self.chunk.resize(self.chunk_capacity, 0);
            let (result, read, written, _) =
                self.encoder
                    .encode_from_utf8(&self.source[self.src_pos..], &mut self.chunk, true);
            self.src_pos += read;
            self.chunk.truncate(written);
            if result == CoderResult::InputEmpty {
                self.flushed = true;
            }
            debug_assert!(
                read > 0 || written > 0 || self.flushed,
                "encoder made no progress"
            );
            if written > 0 {
                return true;
            }
            if self.flushed {
                return false;
            }
            // Zero bytes from a pure state transition; encode again.
        }
    }

    /// Re-derives encoder state for the externally set position.
    ///
    /// Variable-width encodings leave no shortcut: the only correct way back
    /// to a byte offset is a fresh encode from the start, discarding output
    /// until the cumulative count reaches the target. O(n) in source length.
    fn resync(&mut self) {
        let target = self.position;
        #[cfg(feature = "log")]
        log::trace!("re-encoding from start to resynchronize at byte offset {target}");
        self.encoder = self.encoding.new_encoder();
        self.src_pos = 0;
        self.flushed = false;
        self.chunk.clear();
        self.chunk_pos = 0;
        if target == 0 {
            return;
        }
        let mut skipped = 0u64;
        while self.refill() {
            let chunk_len = self.chunk.len() as u64;
            if skipped + chunk_len <= target {
                // The whole chunk lies before the target; discard it.
                skipped += chunk_len;
                continue;
            }
            // The target falls inside this chunk; keep it and deliver from
            // the in-chunk offset.
            self.chunk_pos = (target - skipped) as usize;
            return;
        }
        // Target at or past the encoded end: reads will return 0 while
        // `position` keeps reporting the caller's value.
    }
}

impl ByteStream for EncodedTextStream<'_> {
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

    /// Total encoded length in bytes.
    ///
    /// The first call runs a full counting pass with a fresh encoder (the
    /// stream cursor is untouched) and caches the result. The source is
    /// immutable for the stream's lifetime, so the cache is never
    /// invalidated.
    fn len(&mut self) -> Result<u64> {
        self.ensure_open()?;
        if let Some(len) = self.cached_len {
            return Ok(len);
        }
        #[cfg(feature = "log")]
        log::trace!("running full encoding pass to compute stream length");
        let mut encoder = self.encoding.new_encoder();
        let mut scratch = vec![0u8; self.chunk_capacity];
        let mut pos = 0usize;
        let mut total = 0u64;
        loop {
            let (result, read, written, _) =
                encoder.encode_from_utf8(&self.source[pos..], &mut scratch, true);
            pos += read;
            total += written as u64;
            if result == CoderResult::InputEmpty {
                break;
            }
        }
        self.cached_len = Some(total);
        Ok(total)
    }

    fn position(&self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.position)
    }

    fn set_position(&mut self, pos: u64) -> Result<()> {
        self.ensure_open()?;
        if pos == self.position && !self.needs_resync {
            return Ok(());
        }
        self.position = pos;
        self.needs_resync = true;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        if self.needs_resync {
            self.resync();
            self.needs_resync = false;
        }
        let mut copied = 0;
        while copied < buf.len() {
            if self.chunk_pos >= self.chunk.len() && !self.refill() {
                break;
            }
            let n = min(self.chunk.len() - self.chunk_pos, buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&self.chunk[self.chunk_pos..self.chunk_pos + n]);
            self.chunk_pos += n;
            copied += n;
            self.position += n as u64;
        }
        Ok(copied)
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&mut self) {
        self.open = false;
    }
}

impl fmt::Debug for EncodedTextStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedTextStream")
            .field("encoding", &self.encoding.name())
            .field("source_len", &self.source.len())
            .field("position", &self.position)
            .field("needs_resync", &self.needs_resync)
            .field("open", &self.open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SeekFrom;
    use encoding_rs::{ISO_2022_JP, SHIFT_JIS, UTF_8, WINDOWS_1252};

    #[test]
    fn short_reads_drain_single_byte_encoding() {
        let mut s = EncodedTextStream::new("hello", WINDOWS_1252);
        let mut out = [0u8; 3];
        assert_eq!(s.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"hel");
        assert_eq!(s.read(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], b"lo");
        assert_eq!(s.read(&mut out).unwrap(), 0);
        assert_eq!(s.position().unwrap(), 5);
    }

    #[test]
    fn direct_position_set_forces_reencode() {
        let mut s = EncodedTextStream::new("hello", WINDOWS_1252);
        s.set_position(2).unwrap();
        assert_eq!(s.position().unwrap(), 2);
        let mut out = [0u8; 3];
        assert_eq!(s.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"llo");
    }

    #[test]
    fn length_matches_one_pass_encode_and_is_cached() {
        let mut s = EncodedTextStream::new("héllo wörld", UTF_8);
        let expected = "héllo wörld".len() as u64;
        assert_eq!(s.len().unwrap(), expected);
        assert_eq!(s.len().unwrap(), expected);
        // Length pass must not disturb the cursor.
        let mut out = [0u8; 2];
        assert_eq!(s.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"h\xc3");
    }

    #[test]
    fn multibyte_encoding_round_trips() {
        let text = "日本語のテキスト";
        let mut s = EncodedTextStream::with_chunk_capacity(text, SHIFT_JIS, 32).unwrap();
        let mut all = alloc::vec::Vec::new();
        s.read_to_end(&mut all).unwrap();
        let (expected, _, _) = SHIFT_JIS.encode(text);
        assert_eq!(all, expected.into_owned());
    }

    #[test]
    fn stateful_encoding_flushes_exactly_once_at_end() {
        // ISO-2022-JP must shift back to ASCII at the true end of the
        // stream, and only there, regardless of chunking.
        let text = "今日は";
        let (expected, _, _) = ISO_2022_JP.encode(text);
        let mut s = EncodedTextStream::with_chunk_capacity(text, ISO_2022_JP, 32).unwrap();
        let mut all = alloc::vec::Vec::new();
        // One byte at a time exercises many refills.
        let mut one = [0u8; 1];
        loop {
            let n = s.read(&mut one).unwrap();
            if n == 0 {
                break;
            }
            all.push(one[0]);
        }
        assert_eq!(all, expected.into_owned());
    }

    #[test]
    fn resync_agrees_with_suffix_of_one_pass_encode() {
        let text = "今日は世界 mixed ascii と日本語";
        let (full, _, _) = ISO_2022_JP.encode(text);
        let full = full.into_owned();
        for p in 0..=full.len() {
            let mut s = EncodedTextStream::with_chunk_capacity(text, ISO_2022_JP, 32).unwrap();
            assert_eq!(s.seek(SeekFrom::Start(p as u64)).unwrap(), p as u64);
            let mut rest = alloc::vec::Vec::new();
            s.read_to_end(&mut rest).unwrap();
            assert_eq!(rest, &full[p..], "diverged at byte offset {p}");
        }
    }

    #[test]
    fn seek_past_encoded_end_reads_nothing() {
        let mut s = EncodedTextStream::new("abc", UTF_8);
        s.set_position(100).unwrap();
        assert_eq!(s.read(&mut [0u8; 4]).unwrap(), 0);
        assert_eq!(s.position().unwrap(), 100);
        // Seeking back resynchronizes to real data.
        s.set_position(1).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(s.read(&mut out).unwrap(), 2);
        assert_eq!(&out[..2], b"bc");
    }

    #[test]
    fn empty_source() {
        let mut s = EncodedTextStream::new("", UTF_8);
        assert_eq!(s.len().unwrap(), 0);
        assert_eq!(s.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn zero_chunk_capacity_rejected() {
        assert_eq!(
            EncodedTextStream::with_chunk_capacity("x", UTF_8, 0).unwrap_err(),
            StreamError::InvalidArgument("chunk capacity must be non-zero")
        );
    }

    #[test]
    fn write_and_set_len_unsupported() {
        let mut s = EncodedTextStream::new("ro", UTF_8);
        assert!(matches!(s.write(b"x"), Err(StreamError::Unsupported(_))));
        assert!(matches!(s.set_len(1), Err(StreamError::Unsupported(_))));
    }

    #[test]
    fn closed_stream_fails() {
        let mut s = EncodedTextStream::new("abc", UTF_8);
        s.close();
        s.close();
        assert_eq!(s.read(&mut [0u8; 1]), Err(StreamError::Closed));
        assert_eq!(s.len(), Err(StreamError::Closed));
        assert_eq!(s.set_position(0), Err(StreamError::Closed));
    }
}
