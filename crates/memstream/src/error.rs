use thiserror::Error;

/// Errors reported by the stream adapters.
///
/// Every variant is a caller-contract violation rather than an environmental
/// failure, so nothing here is retried internally. Arguments are validated
/// before any state changes; a call that returns an error leaves the stream
/// exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// An I/O operation was invoked after [`close`](crate::ByteStream::close).
    #[error("stream has been closed")]
    Closed,

    /// The operation is outside the stream's capability flags, such as a
    /// write on a read-only stream or a write that would exceed a fixed
    /// capacity.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A constructor or operation argument was rejected up front.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A seek resolved to a negative (or unrepresentable) absolute position.
    #[error("seek resolves to an invalid absolute position")]
    InvalidSeek,

    /// The cancellation signal was already set when the operation started.
    #[error("operation cancelled before it started")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, StreamError>;
