//! Exact-size stream to stream transfer.
//!
//! This module provides the copy primitive shared by both body framings:
//! move exactly N bytes from a source to a sink through a fixed scratch
//! buffer, re-driving short reads and partial writes until the quota is
//! met. Reaching eof before the quota is an error, because the framing
//! already promised those bytes exist.

use std::cmp;
use std::io::{self, ErrorKind, Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::DecodeError;

/// Copies exactly `count` bytes from `reader` to `writer` through `scratch`.
///
/// Every block of bytes produced by a read is fully drained into the writer
/// before the next read is issued, so the sink always holds a prefix of the
/// source and no byte beyond the quota is ever read. `count == 0` returns
/// without touching either stream.
pub(crate) fn transfer_exact<R, W>(
    reader: &mut R,
    writer: &mut W,
    mut count: u64,
    scratch: &mut [u8],
) -> Result<(), DecodeError>
where
    R: Read,
    W: Write,
{
    while count > 0 {
        let limit = cmp::min(count, scratch.len() as u64) as usize;
        let read = read_some(reader, &mut scratch[..limit])?;
        write_drain(writer, &scratch[..read])?;
        count -= read as u64;
    }
    Ok(())
}

/// Reads and discards exactly `count` bytes from `reader`.
///
/// Used for the CRLF that terminates each chunk record; the discarded bytes
/// are not validated.
pub(crate) fn discard_exact<R>(reader: &mut R, mut count: u64, scratch: &mut [u8]) -> Result<(), DecodeError>
where
    R: Read,
{
    while count > 0 {
        let limit = cmp::min(count, scratch.len() as u64) as usize;
        let read = read_some(reader, &mut scratch[..limit])?;
        count -= read as u64;
    }
    Ok(())
}

/// Reads at least one byte into `buf`.
///
/// Interrupted reads are retried in place; eof surfaces as
/// [`DecodeError::UnexpectedEof`] because callers only ask for bytes the
/// framing still owes them.
pub(crate) fn read_some<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DecodeError>
where
    R: Read,
{
    loop {
        match reader.read(buf) {
            Ok(0) => return Err(DecodeError::UnexpectedEof),
            Ok(read) => return Ok(read),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::io(e)),
        }
    }
}

fn write_drain<W>(writer: &mut W, mut buf: &[u8]) -> Result<(), DecodeError>
where
    W: Write,
{
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => {
                return Err(DecodeError::io(io::Error::new(
                    ErrorKind::WriteZero,
                    "sink no longer accepts bytes",
                )))
            }
            Ok(written) => buf = &buf[written..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::io(e)),
        }
    }
    Ok(())
}

/// Asynchronous counterpart of [`transfer_exact`].
///
/// Identical framing semantics; the only suspension points are the awaits
/// around the stream operations themselves.
pub(crate) async fn transfer_exact_async<R, W>(
    reader: &mut R,
    writer: &mut W,
    mut count: u64,
    scratch: &mut [u8],
) -> Result<(), DecodeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while count > 0 {
        let limit = cmp::min(count, scratch.len() as u64) as usize;
        let read = read_some_async(reader, &mut scratch[..limit]).await?;
        write_drain_async(writer, &scratch[..read]).await?;
        count -= read as u64;
    }
    Ok(())
}

/// Asynchronous counterpart of [`discard_exact`].
pub(crate) async fn discard_exact_async<R>(
    reader: &mut R,
    mut count: u64,
    scratch: &mut [u8],
) -> Result<(), DecodeError>
where
    R: AsyncRead + Unpin,
{
    while count > 0 {
        let limit = cmp::min(count, scratch.len() as u64) as usize;
        let read = read_some_async(reader, &mut scratch[..limit]).await?;
        count -= read as u64;
    }
    Ok(())
}

/// Asynchronous counterpart of [`read_some`].
pub(crate) async fn read_some_async<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DecodeError>
where
    R: AsyncRead + Unpin,
{
    loop {
        match reader.read(buf).await {
            Ok(0) => return Err(DecodeError::UnexpectedEof),
            Ok(read) => return Ok(read),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::io(e)),
        }
    }
}

async fn write_drain_async<W>(writer: &mut W, mut buf: &[u8]) -> Result<(), DecodeError>
where
    W: AsyncWrite + Unpin,
{
    while !buf.is_empty() {
        match writer.write(buf).await {
            Ok(0) => {
                return Err(DecodeError::io(io::Error::new(
                    ErrorKind::WriteZero,
                    "sink no longer accepts bytes",
                )))
            }
            Ok(written) => buf = &buf[written..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::io(e)),
        }
    }
    Ok(())
}
