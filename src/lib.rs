//! Body decoding for HTTP/1.x messages.
//!
//! Given an already-parsed header set and a stream positioned at the first
//! body octet, [`decode`] and [`decode_async`] drain exactly the bytes that
//! constitute the message body into a caller-supplied sink, supporting both
//! the identity framing (`Content-Length`) and the chunked transfer coding.
//! Header parsing, connection management and stream implementations live in
//! the layers around this crate.

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

pub use codec::{decode, decode_async, ChunkedEncoder};
pub use protocol::{BodySize, DecodeError};
