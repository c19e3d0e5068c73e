mod body_size;
pub use body_size::BodySize;

mod error;
pub use error::DecodeError;
