//! Decoder for the chunked transfer coding.
//!
//! A chunked body is a sequence of `<hex-size>\r\n<payload>\r\n` records
//! terminated by a zero-size record followed by one more CRLF. The decoder
//! drives three smaller operations in a loop: read a size line, copy that
//! many payload bytes, skip the two-byte record terminator. The skipped
//! bytes are not validated, and trailer fields after the zero-size record
//! are not parsed; exactly two bytes are consumed past the final size line.

use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::trace;

use crate::protocol::DecodeError;

use super::{chunk_line, transfer};

/// Length of the CRLF that terminates each chunk record.
const RECORD_TERMINATOR_LEN: u64 = 2;

/// Drains a chunked body from `reader` into `writer`.
///
/// Returns the number of payload bytes written to the sink, which excludes
/// all framing overhead.
pub(crate) fn decode_chunked<R, W>(reader: &mut R, writer: &mut W, scratch: &mut [u8]) -> Result<u64, DecodeError>
where
    R: Read,
    W: Write,
{
    let mut total = 0u64;

    loop {
        let chunk_size = chunk_line::read_size_line(reader)?;
        trace!(chunk_size, "read chunk size line");

        if chunk_size == 0 {
            // the zero-size record ends the body; its trailing CRLF is
            // consumed and dropped, trailers are left to a higher layer
            transfer::discard_exact(reader, RECORD_TERMINATOR_LEN, scratch)?;
            trace!(total, "finished reading chunked body");
            return Ok(total);
        }

        transfer::transfer_exact(reader, writer, chunk_size, scratch)?;
        transfer::discard_exact(reader, RECORD_TERMINATOR_LEN, scratch)?;
        total += chunk_size;
    }
}

/// Asynchronous counterpart of [`decode_chunked`].
pub(crate) async fn decode_chunked_async<R, W>(
    reader: &mut R,
    writer: &mut W,
    scratch: &mut [u8],
) -> Result<u64, DecodeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut total = 0u64;

    loop {
        let chunk_size = chunk_line::read_size_line_async(reader).await?;
        trace!(chunk_size, "read chunk size line");

        if chunk_size == 0 {
            transfer::discard_exact_async(reader, RECORD_TERMINATOR_LEN, scratch).await?;
            trace!(total, "finished reading chunked body");
            return Ok(total);
        }

        transfer::transfer_exact_async(reader, writer, chunk_size, scratch).await?;
        transfer::discard_exact_async(reader, RECORD_TERMINATOR_LEN, scratch).await?;
        total += chunk_size;
    }
}
