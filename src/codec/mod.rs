//! Body decoding entry points.
//!
//! This module wires the framing dispatch to the two decoding drivers:
//!
//! - Identity framing: a fixed `Content-Length` drained through the
//!   exact-size transfer in `transfer`
//! - Chunked framing: the record loop in `chunked`, built from the size
//!   line reader in `chunk_line` and the same transfer primitive
//!
//! Both framings are exposed twice with identical observable behaviour: a
//! blocking entry point over [`std::io`] streams and an asynchronous entry
//! point over [`tokio::io`] streams. The blocking stream contract hides non-readiness,
//! so only interrupted operations are retried there; the asynchronous
//! drivers additionally suspend whenever the underlying stream returns
//! pending, and resume when the runtime signals readiness.

mod chunk_line;
mod chunked;
mod chunked_encoder;
mod transfer;

pub use chunked_encoder::ChunkedEncoder;

use std::io::{Read, Write};

use http::HeaderMap;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::trace;

use crate::protocol::{BodySize, DecodeError};

/// Size of the per-decode scratch buffer used to shuttle payload bytes.
///
/// Correctness does not depend on this value, only throughput.
const TRANSFER_BUFFER_SIZE: usize = 8 * 1024;

/// Drains the message body from `reader` into `writer`, blocking until the
/// body is complete.
///
/// The framing is picked from the already-parsed header set:
/// `Transfer-Encoding: chunked` selects the chunked decoder and takes
/// precedence over `Content-Length`; a bare `Content-Length` drains exactly
/// that many bytes; a message carrying neither header has no body and the
/// call is a no-op.
///
/// Returns the number of body bytes written to the sink, excluding chunked
/// framing overhead.
///
/// # Errors
///
/// Any error terminates the decode immediately. The sink may then hold a
/// prefix of the body and the source is left at an indeterminate framing
/// position, so the connection must not be reused.
///
/// # Examples
///
/// ```
/// use http::{header, HeaderMap};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
///
/// let mut source = &b"5\r\nhello\r\n0\r\n\r\n"[..];
/// let mut sink = Vec::new();
///
/// let written = micro_body::decode(&headers, &mut source, &mut sink)?;
/// assert_eq!(written, 5);
/// assert_eq!(sink, b"hello");
/// # Ok::<(), micro_body::DecodeError>(())
/// ```
pub fn decode<R, W>(headers: &HeaderMap, reader: &mut R, writer: &mut W) -> Result<u64, DecodeError>
where
    R: Read,
    W: Write,
{
    let body_size = BodySize::from_headers(headers)?;
    trace!(body_size = ?body_size, "resolved body framing");

    match body_size {
        BodySize::Empty => Ok(0),
        BodySize::Length(length) => {
            let mut scratch = vec![0u8; TRANSFER_BUFFER_SIZE];
            transfer::transfer_exact(reader, writer, length, &mut scratch)?;
            Ok(length)
        }
        BodySize::Chunked => {
            let mut scratch = vec![0u8; TRANSFER_BUFFER_SIZE];
            chunked::decode_chunked(reader, writer, &mut scratch)
        }
    }
}

/// Drains the message body from `reader` into `writer` cooperatively.
///
/// Same contract as [`decode`], expressed against the asynchronous stream
/// traits: the returned future suspends only around the read and write
/// operations themselves and produces a byte-identical sink for any stream
/// trace the blocking entry point can also consume.
///
/// # Examples
///
/// ```
/// use http::{header, HeaderMap};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::CONTENT_LENGTH, "5".parse().unwrap());
///
/// let mut source = &b"hello"[..];
/// let mut sink = Vec::new();
///
/// futures::executor::block_on(async {
///     micro_body::decode_async(&headers, &mut source, &mut sink).await
/// })?;
/// assert_eq!(sink, b"hello");
/// # Ok::<(), micro_body::DecodeError>(())
/// ```
pub async fn decode_async<R, W>(headers: &HeaderMap, reader: &mut R, writer: &mut W) -> Result<u64, DecodeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let body_size = BodySize::from_headers(headers)?;
    trace!(body_size = ?body_size, "resolved body framing");

    match body_size {
        BodySize::Empty => Ok(0),
        BodySize::Length(length) => {
            let mut scratch = vec![0u8; TRANSFER_BUFFER_SIZE];
            transfer::transfer_exact_async(reader, writer, length, &mut scratch).await?;
            Ok(length)
        }
        BodySize::Chunked => {
            let mut scratch = vec![0u8; TRANSFER_BUFFER_SIZE];
            chunked::decode_chunked_async(reader, writer, &mut scratch).await
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stream doubles shared by the codec tests.

    use std::cmp;
    use std::io::{self, ErrorKind, Read, Write};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, ReadBuf};

    /// Yields at most one byte per read call.
    pub(crate) struct TrickleReader {
        data: Vec<u8>,
        pos: usize,
    }

    impl TrickleReader {
        pub(crate) fn new(data: &[u8]) -> Self {
            Self { data: data.to_vec(), pos: 0 }
        }
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let amt = cmp::min(1, cmp::min(buf.len(), self.data.len() - self.pos));
            buf[..amt].copy_from_slice(&self.data[self.pos..self.pos + amt]);
            self.pos += amt;
            Ok(amt)
        }
    }

    /// Fails with `Interrupted` on every other read call, and otherwise
    /// yields one byte.
    pub(crate) struct InterruptReader {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl InterruptReader {
        pub(crate) fn new(data: &[u8]) -> Self {
            Self { data: data.to_vec(), pos: 0, interrupt: true }
        }

        pub(crate) fn remaining(&self) -> &[u8] {
            &self.data[self.pos..]
        }
    }

    impl Read for InterruptReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt {
                self.interrupt = false;
                return Err(io::Error::new(ErrorKind::Interrupted, "interrupted"));
            }
            self.interrupt = true;

            let amt = cmp::min(1, cmp::min(buf.len(), self.data.len() - self.pos));
            buf[..amt].copy_from_slice(&self.data[self.pos..self.pos + amt]);
            self.pos += amt;
            Ok(amt)
        }
    }

    /// Accepts at most `width` bytes per write call.
    pub(crate) struct ShortWriter {
        width: usize,
        data: Vec<u8>,
    }

    impl ShortWriter {
        pub(crate) fn new(width: usize) -> Self {
            Self { width, data: Vec::new() }
        }

        pub(crate) fn written(&self) -> &[u8] {
            &self.data
        }
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let amt = cmp::min(self.width, buf.len());
            self.data.extend_from_slice(&buf[..amt]);
            Ok(amt)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Returns `Pending` on every other poll, and otherwise yields one
    /// byte. Models a stream that keeps losing and regaining readiness.
    pub(crate) struct PendingReader {
        data: Vec<u8>,
        pos: usize,
        pending: bool,
    }

    impl PendingReader {
        pub(crate) fn new(data: &[u8]) -> Self {
            Self { data: data.to_vec(), pos: 0, pending: true }
        }

        pub(crate) fn remaining(&self) -> &[u8] {
            &self.data[self.pos..]
        }
    }

    impl AsyncRead for PendingReader {
        fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            if self.pending {
                self.pending = false;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.pending = true;

            if self.pos < self.data.len() {
                let pos = self.pos;
                buf.put_slice(&self.data[pos..pos + 1]);
                self.pos += 1;
            }
            Poll::Ready(Ok(()))
        }
    }
}
