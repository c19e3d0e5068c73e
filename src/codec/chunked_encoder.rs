//! Encoder for the chunked transfer coding.
//!
//! The outgoing counterpart of the chunked decoder: frames payload data as
//! `<hex-size>\r\n<payload>\r\n` records and closes the body with the
//! zero-size record. Mostly useful for proxies and for exercising the
//! decoder against its own wire format.

use std::io;
use std::io::Write;

use bytes::BytesMut;

/// An encoder producing chunked transfer coding records.
///
/// Each call to [`encode`](Self::encode) appends one complete record to the
/// output buffer; [`encode_eof`](Self::encode_eof) appends the terminating
/// `0\r\n\r\n` once, after which the encoder refuses further data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    /// Indicates if the final zero-size record has been written
    eof: bool,
}

impl ChunkedEncoder {
    /// Creates a new ChunkedEncoder instance.
    pub fn new() -> Self {
        Self { eof: false }
    }

    /// Returns whether the terminating record has been written.
    pub fn is_finished(&self) -> bool {
        self.eof
    }

    /// Appends one chunk record carrying `data` to `dst`.
    ///
    /// Empty data is skipped entirely: a zero-size record would terminate
    /// the body early on the receiving side.
    pub fn encode(&mut self, data: &[u8], dst: &mut BytesMut) -> io::Result<()> {
        if self.eof || data.is_empty() {
            return Ok(());
        }

        // chunk size in hex followed by CRLF
        write!(helper::Writer(dst), "{:X}\r\n", data.len())?;
        dst.reserve(data.len() + 2);
        dst.extend_from_slice(data);
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Appends the terminating zero-size record to `dst`.
    pub fn encode_eof(&mut self, dst: &mut BytesMut) {
        if self.eof {
            return;
        }
        self.eof = true;
        dst.extend_from_slice(b"0\r\n\r\n");
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper module providing a Writer implementation for BytesMut, so the
/// chunk size can be formatted in hexadecimal without an intermediate
/// allocation.
mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
