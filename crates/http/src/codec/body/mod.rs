//! Body decoding for responses.
//!
//! A response body is buffered until the connection closes, then decoded in two
//! strictly ordered steps:
//!
//! 1. [`TransferDecoder`]: undoes the transfer coding (`chunked` or none)
//! 2. [`ContentDecoder`]: undoes the content coding (`gzip` or none)
//!
//! The [`ChunkedDecoder`] also implements `tokio_util::codec::Decoder` and can be used
//! on its own for incremental input.

mod chunked_decoder;
mod content_decoder;
mod transfer_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use content_decoder::ContentDecoder;
pub use transfer_decoder::TransferDecoder;
