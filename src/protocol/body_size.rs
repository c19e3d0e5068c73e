//! Body framing resolution from message headers
//!
//! HTTP/1.x marks the extent of a message body in one of two ways: a fixed
//! `Content-Length`, or the chunked transfer coding. [`BodySize`] is the
//! outcome of inspecting the header set once, before any body byte is read.

use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderValue};

use super::DecodeError;

/// Represents the framing of an incoming message body.
///
/// This enum is used to determine how the body should be drained:
/// - Known length: drain exactly that many bytes
/// - Chunked: drain using chunked transfer coding
/// - Empty: no body to drain
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodySize {
    /// Body with known length in bytes
    Length(u64),
    /// Body using chunked transfer coding
    Chunked,
    /// No body
    Empty,
}

impl BodySize {
    /// Returns true if the body uses chunked transfer coding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodySize::Chunked)
    }

    /// Returns true if the message has no body
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodySize::Empty)
    }

    /// Resolves the body framing for a parsed header set.
    ///
    /// `Transfer-Encoding: chunked` takes precedence over `Content-Length`
    /// when both are present; the two are not cross-validated. A message
    /// carrying neither header has no body, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidContentLength`] when `Content-Length`
    /// is present but does not parse as a non-negative integer.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, DecodeError> {
        if is_chunked(headers.get(TRANSFER_ENCODING)) {
            return Ok(BodySize::Chunked);
        }

        match headers.get(CONTENT_LENGTH) {
            None => Ok(BodySize::Empty),
            Some(value) => {
                let cl_str = value
                    .to_str()
                    .map_err(|_| DecodeError::invalid_content_length("value can't to_str"))?;

                let length = cl_str
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| DecodeError::invalid_content_length(format!("value {cl_str} is not u64")))?;

                Ok(BodySize::Length(length))
            }
        }
    }
}

fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    header_value
        .and_then(|value| value.to_str().ok())
        .map(|encoding| encoding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}
