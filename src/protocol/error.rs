//! Error types for body decoding
//!
//! [`DecodeError`] is the single error type surfaced by this crate. Every
//! variant terminates the decode it occurred in; none of them are retried at
//! this layer. After a failed decode the source stream is left at an
//! indeterminate framing position and the connection must not be reused.
use std::io;
use thiserror::Error;

/// Errors that occur while draining a message body
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The `Content-Length` header is present but does not parse as a
    /// non-negative integer
    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    /// A chunk size line carries more payload bytes before its CR than the
    /// line buffer admits
    #[error("chunk size line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// A bare CRLF was read where a chunk size was expected
    #[error("empty chunk size line")]
    EmptySizeLine,

    /// The source reported eof before the framing said the body was complete
    #[error("unexpected eof while reading body")]
    UnexpectedEof,

    /// The underlying stream surfaced a fatal error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl DecodeError {
    /// Creates a new InvalidContentLength error
    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    /// Creates a new I/O error
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
