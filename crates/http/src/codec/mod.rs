//! HTTP codec module for encoding requests and decoding responses
//!
//! # Architecture
//!
//! - Request side:
//!   - [`RequestEncoder`]: Encodes the fixed `GET` request head from a [`GetRequest`]
//!
//! - Response side:
//!   - [`ResponseDecoder`]: Decodes a complete response, head first, body at end-of-stream
//!   - Head parsing via [`HeaderDecoder`]
//!   - Body decoding via [`TransferDecoder`] (chunked) and [`ContentDecoder`] (gzip)
//!
//! # Example
//!
//! ```
//! use micro_fetch_http::codec::{GetRequest, RequestEncoder, ResponseDecoder};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! // Encode the outgoing request
//! let mut request_buffer = BytesMut::new();
//! let request = GetRequest { host: "example.org", path: "/", user_agent: "doc" };
//! RequestEncoder::new().encode(request, &mut request_buffer).unwrap();
//!
//! // Decode the incoming response
//! let mut decoder = ResponseDecoder::new();
//! let mut response_buffer = BytesMut::from("HTTP/1.1 200 OK\r\n\r\nhi");
//! let response = decoder.decode_eof(&mut response_buffer).unwrap();
//! assert!(response.is_some());
//! ```

mod body;
mod header;
mod response_decoder;

pub use body::ChunkedDecoder;
pub use body::ContentDecoder;
pub use body::TransferDecoder;
pub use header::DEFAULT_MAX_HEADER_BYTES;
pub use header::GetRequest;
pub use header::HeaderDecoder;
pub use header::RequestEncoder;
pub use response_decoder::ResponseDecoder;
