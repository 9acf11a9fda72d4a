//! Seekable stream over a logically contiguous, physically chunked byte
//! sequence.
//!
//! The segments are a snapshot taken at construction and never mutated by the
//! stream. Positioning works on two levels: an internal cursor (segment
//! index plus in-segment offset) that is valid whenever the absolute position
//! lies within `[0, len]`, and an absolute byte offset derived from a
//! prefix-sum table over the segment lengths. The table doubles as the
//! segment locator: an arbitrary absolute offset maps to its segment with a
//! binary search.
//!
//! Seeking past the logical end is legal, but the chunked representation has
//! no addressable position beyond its last byte. Instead of growing the
//! collection with a phantom tail, the stream pins the cursor at the logical
//! end and records the requested absolute position in a sentinel. While the
//! sentinel is set, `position` reports the recorded value and reads return
//! zero bytes; any in-range seek clears it.

use alloc::vec::Vec;
use core::cmp::min;
use core::fmt;

use crate::{
    error::{Result, StreamError},
    stream::ByteStream,
};

/// Read-only, seekable view over an ordered sequence of byte segments.
///
/// Works with any segment type that can lend its bytes: `Vec<u8>`,
/// `&[u8]`, `Box<[u8]>`, `Arc<[u8]>`, and so on.
pub struct SegmentedByteStream<T = Vec<u8>>
where
    T: AsRef<[u8]>,
{
    segments: Vec<T>,
    /// `starts[i]` is the absolute offset of segment `i`; the final entry is
    /// the total logical length.
    starts: Vec<u64>,
    /// Cursor segment index; equals `segments.len()` at the logical end.
    seg: usize,
    /// Offset within the cursor segment.
    off: usize,
    /// Requested absolute position when the caller seeked at or past the
    /// logical end. Exactly one of this sentinel and the cursor governs
    /// `position`.
    past_end: Option<u64>,
    open: bool,
}

impl<T: AsRef<[u8]>> SegmentedByteStream<T> {
    /// Creates a stream over a snapshot of `segments`. Empty segments are
    /// permitted and contribute no bytes.
    #[must_use]
    pub fn new(segments: Vec<T>) -> Self {
        let mut starts = Vec::with_capacity(segments.len() + 1);
        let mut total = 0u64;
        starts.push(0);
        for segment in &segments {
            total += segment.as_ref().len() as u64;
            starts.push(total);
        }
        Self {
            segments,
            starts,
            seg: 0,
            off: 0,
            past_end: None,
            open: true,
        }
    }

    /// Number of underlying segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn total_len(&self) -> u64 {
        *self.starts.last().unwrap_or(&0)
    }

    /// Maps an in-range absolute offset to (segment, in-segment offset).
    ///
    /// With duplicate prefix sums (empty segments) this lands on the last
    /// segment starting at or before `abs`; the read loop skips empties.
    fn locate(&self, abs: u64) -> (usize, usize) {
        debug_assert!(abs < self.total_len());
        let seg = self.starts.partition_point(|&start| start <= abs) - 1;
        let off = (abs - self.starts[seg]) as usize;
        (seg, off)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(StreamError::Closed) }
    }
}

impl<T: AsRef<[u8]>> ByteStream for SegmentedByteStream<T> {
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
        Ok(self.total_len())
    }

    fn position(&self) -> Result<u64> {
        self.ensure_open()?;
        match self.past_end {
            Some(requested) => Ok(requested),
            None => Ok(self.starts[self.seg] + self.off as u64),
        }
    }

    fn set_position(&mut self, pos: u64) -> Result<()> {
        self.ensure_open()?;
        if pos >= self.total_len() {
            self.seg = self.segments.len();
            self.off = 0;
            self.past_end = Some(pos);
        } else {
            let (seg, off) = self.locate(pos);
            self.seg = seg;
            self.off = off;
            self.past_end = None;
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        if self.past_end.is_some() {
            return Ok(0);
        }
        let mut copied = 0;
        while copied < buf.len() && self.seg < self.segments.len() {
            let data = self.segments[self.seg].as_ref();
            if self.off >= data.len() {
                self.seg += 1;
                self.off = 0;
                continue;
            }
            let n = min(data.len() - self.off, buf.len() - copied);
            buf[copied..copied + n].copy_from_slice(&data[self.off..self.off + n]);
            copied += n;
            self.off += n;
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

impl<T: AsRef<[u8]>> fmt::Debug for SegmentedByteStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentedByteStream")
            .field("segments", &self.segments.len())
            .field("len", &self.total_len())
            .field("seg", &self.seg)
            .field("off", &self.off)
            .field("past_end", &self.past_end)
            .field("open", &self.open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SeekFrom;
    use alloc::vec;

    fn abcde() -> SegmentedByteStream<&'static [u8]> {
        SegmentedByteStream::new(vec![&b"AB"[..], &b"CDE"[..]])
    }

    #[test]
    fn read_spans_segment_boundary() {
        let mut s = abcde();
        assert_eq!(s.seek(SeekFrom::Start(1)).unwrap(), 1);
        let mut out = [0u8; 4];
        assert_eq!(s.read(&mut out).unwrap(), 4);
        assert_eq!(&out, b"BCDE");
        assert_eq!(s.position().unwrap(), 5);
    }

    #[test]
    fn seek_past_end_reports_position_and_reads_nothing() {
        let mut s = abcde();
        assert_eq!(s.seek(SeekFrom::Start(10)).unwrap(), 10);
        assert_eq!(s.position().unwrap(), 10);
        let mut out = [0u8; 4];
        assert_eq!(s.read(&mut out).unwrap(), 0);
        // An in-range seek clears the sentinel.
        assert_eq!(s.seek(SeekFrom::Start(0)).unwrap(), 0);
        assert_eq!(s.read(&mut out).unwrap(), 4);
        assert_eq!(&out, b"ABCD");
    }

    #[test]
    fn relative_seek_from_past_end_position() {
        let mut s = abcde();
        s.set_position(10).unwrap();
        // Current-relative math uses the reported (past-end) position.
        assert_eq!(s.seek(SeekFrom::Current(-7)).unwrap(), 3);
        let mut out = [0u8; 2];
        assert_eq!(s.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"DE");
    }

    #[test]
    fn empty_segments_are_skipped() {
        let mut s = SegmentedByteStream::new(vec![
            b"".to_vec(),
            b"xy".to_vec(),
            b"".to_vec(),
            b"z".to_vec(),
        ]);
        assert_eq!(s.len().unwrap(), 3);
        s.set_position(2).unwrap();
        let mut out = [0u8; 2];
        assert_eq!(s.read(&mut out).unwrap(), 1);
        assert_eq!(out[0], b'z');
    }

    #[test]
    fn empty_sequence() {
        let mut s: SegmentedByteStream = SegmentedByteStream::new(vec![]);
        assert_eq!(s.len().unwrap(), 0);
        assert_eq!(s.read(&mut [0u8; 4]).unwrap(), 0);
        assert_eq!(s.seek(SeekFrom::Start(0)).unwrap(), 0);
        assert_eq!(s.position().unwrap(), 0);
    }

    #[test]
    fn negative_seek_rejected() {
        let mut s = abcde();
        assert_eq!(s.seek(SeekFrom::End(-9)), Err(StreamError::InvalidSeek));
        assert_eq!(s.position().unwrap(), 0);
    }

    #[test]
    fn closed_stream_fails() {
        let mut s = abcde();
        s.close();
        assert_eq!(s.read(&mut [0u8; 1]), Err(StreamError::Closed));
        assert_eq!(s.position(), Err(StreamError::Closed));
        assert_eq!(s.flush(), Err(StreamError::Closed));
    }
}
