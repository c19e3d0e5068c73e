//! Chunk size line reader.
//!
//! Every chunk record opens with a size line: hexadecimal digits terminated
//! by CRLF. The line is pulled from the stream one byte at a time into a
//! small stack buffer and parsed once the terminator has been consumed, so
//! the stream cursor never moves past the line itself.

use std::io::Read;

use tokio::io::AsyncRead;
use tracing::warn;

use crate::ensure;
use crate::protocol::DecodeError;

use super::transfer;

/// Upper bound on the payload bytes of a chunk size line.
///
/// Eight hex digits cap a single chunk at 0xFFFFFFFF bytes.
pub(crate) const MAX_SIZE_LINE: usize = 8;

/// Accumulator for the bytes of one chunk size line.
#[derive(Debug)]
struct SizeLine {
    buf: [u8; MAX_SIZE_LINE],
    len: usize,
    terminating: bool,
}

impl SizeLine {
    fn new() -> Self {
        Self { buf: [0; MAX_SIZE_LINE], len: 0, terminating: false }
    }

    /// Feeds one byte into the line.
    ///
    /// Returns true once the line terminator has been consumed. A CR
    /// followed by anything other than LF is tolerated: the stray byte is
    /// consumed in the LF position and a warning is logged.
    fn push(&mut self, byte: u8) -> Result<bool, DecodeError> {
        if self.terminating {
            if byte != b'\n' {
                warn!("invalid chunk size line terminator: {byte:#04x}");
            }
            return Ok(true);
        }

        if byte == b'\r' {
            self.terminating = true;
            return Ok(false);
        }

        ensure!(self.len < MAX_SIZE_LINE, DecodeError::LineTooLong { limit: MAX_SIZE_LINE });
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(false)
    }

    /// Parses the accumulated bytes as a hexadecimal chunk size.
    ///
    /// Parsing is case-insensitive and stops at the first byte that is not
    /// a hex digit, so chunk extensions are ignored rather than rejected.
    /// An empty line is a protocol error.
    fn chunk_size(&self) -> Result<u64, DecodeError> {
        ensure!(self.len > 0, DecodeError::EmptySizeLine);

        let mut size: u64 = 0;
        for &byte in &self.buf[..self.len] {
            let digit = match byte {
                b'0'..=b'9' => byte - b'0',
                b'a'..=b'f' => byte - b'a' + 10,
                b'A'..=b'F' => byte - b'A' + 10,
                _ => break,
            };
            // at most eight digits were admitted, so this cannot overflow
            size = size * 16 + digit as u64;
        }

        Ok(size)
    }
}

/// Reads one chunk size line and returns the parsed chunk size.
pub(crate) fn read_size_line<R>(reader: &mut R) -> Result<u64, DecodeError>
where
    R: Read,
{
    let mut line = SizeLine::new();
    let mut byte = [0u8; 1];

    loop {
        transfer::read_some(reader, &mut byte)?;
        if line.push(byte[0])? {
            return line.chunk_size();
        }
    }
}

/// Asynchronous counterpart of [`read_size_line`].
pub(crate) async fn read_size_line_async<R>(reader: &mut R) -> Result<u64, DecodeError>
where
    R: AsyncRead + Unpin,
{
    let mut line = SizeLine::new();
    let mut byte = [0u8; 1];

    loop {
        transfer::read_some_async(reader, &mut byte).await?;
        if line.push(byte[0])? {
            return line.chunk_size();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_digit() {
        let mut reader = &b"5\r\nrest"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 5);
        assert_eq!(reader, b"rest");
    }

    #[test]
    fn parses_hex_case_insensitive() {
        let mut reader = &b"1A\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 26);

        let mut reader = &b"1a\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 26);
    }

    #[test]
    fn leading_zeros_are_permitted() {
        let mut reader = &b"0005\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 5);
    }

    #[test]
    fn eight_digits_fill_the_buffer() {
        let mut reader = &b"000000FF\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 255);

        let mut reader = &b"FFFFFFFF\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn ninth_payload_byte_is_too_long() {
        let mut reader = &b"123456789\r\n"[..];
        let err = read_size_line(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::LineTooLong { limit: MAX_SIZE_LINE }));
        // the offending ninth byte was consumed before the decode failed
        assert_eq!(reader, b"\r\n");
    }

    #[test]
    fn parse_stops_at_chunk_extension() {
        let mut reader = &b"5;x=1\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 5);
    }

    #[test]
    fn non_hex_prefix_parses_as_zero() {
        // matches the permissive strtol-style parse: no digits means zero,
        // which callers treat as the terminating chunk
        let mut reader = &b"zz\r\n"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 0);
    }

    #[test]
    fn empty_line_is_rejected() {
        let mut reader = &b"\r\n"[..];
        let err = read_size_line(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::EmptySizeLine));
    }

    #[test]
    fn stray_terminator_byte_is_consumed() {
        // CR followed by a non-LF byte: the byte is treated as the line
        // feed and the line still parses
        let mut reader = &b"5\rXrest"[..];
        assert_eq!(read_size_line(&mut reader).unwrap(), 5);
        assert_eq!(reader, b"rest");
    }

    #[test]
    fn eof_inside_line_is_an_error() {
        let mut reader = &b"5"[..];
        let err = read_size_line(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof));
    }

    #[tokio::test]
    async fn async_parses_line() {
        let mut reader = &b"10\r\nrest"[..];
        assert_eq!(read_size_line_async(&mut reader).await.unwrap(), 16);
        assert_eq!(reader, b"rest");
    }
}
