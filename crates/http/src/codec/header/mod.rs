//! HTTP head processing: encoding the request head and decoding the response head
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes the response status line and header fields
//!   - Finds the end of the head without rescanning
//!   - Lossy ASCII decoding, lowercase names, last-write-wins on duplicates
//!   - Head size limit
//!
//! - [`RequestEncoder`]: Encodes the fixed `GET` request head

mod header_decoder;
mod header_encoder;

pub use header_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use header_decoder::HeaderDecoder;
pub use header_encoder::GetRequest;
pub use header_encoder::RequestEncoder;
