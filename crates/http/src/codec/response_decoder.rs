//! HTTP response decoder module
//!
//! Responses to `Connection: close` requests are delimited by the end of the stream,
//! so the decoder works in two phases:
//!
//! 1. [`Decoder::decode`] parses the head with [`HeaderDecoder`] as soon as it is
//!    complete and leaves every following byte in the buffer
//! 2. [`Decoder::decode_eof`] takes the whole remaining buffer as the body, undoes the
//!    transfer coding and then the content coding, and yields the [`RawResponse`]
//!
//! # Example
//!
//! ```
//! use micro_fetch_http::codec::ResponseDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut buffer = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello");
//!
//! // the body only ends when the connection does
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! let response = decoder.decode_eof(&mut buffer).unwrap().unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(&response.body()[..], b"hello");
//! ```

use crate::codec::body::{ContentDecoder, TransferDecoder};
use crate::codec::header::HeaderDecoder;
use crate::protocol::{ParseError, RawResponse, ResponseHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// A decoder for complete HTTP responses
///
/// # State Machine
///
/// The decoder keeps its state in the `head` field:
/// - `None`: Currently parsing the head
/// - `Some(ResponseHead)`: Head parsed, the buffer accumulates the body
#[derive(Debug)]
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    head: Option<ResponseHead>,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self { header_decoder: HeaderDecoder::with_max_header_bytes(max_header_bytes), head: None }
    }

    /// The parsed head, once the separator has been seen.
    pub fn head(&self) -> Option<&ResponseHead> {
        self.head.as_ref()
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder::new(), head: None }
    }
}

impl Decoder for ResponseDecoder {
    type Item = RawResponse;
    type Error = ParseError;

    /// Parses the head when it is complete; never yields a response since the body
    /// runs until end-of-stream.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.head.is_none() {
            if let Some(head) = self.header_decoder.decode(src)? {
                debug!(status = %head.status(), reason = head.reason(), "received response head");
                self.head = Some(head);
            }
        }

        Ok(None)
    }

    /// Finishes the response at end-of-stream.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TruncatedHeaders`] if the stream ended inside the head
    /// - [`ParseError::MalformedChunkedBody`] for broken chunk framing
    /// - [`ParseError::DecompressionFailed`] for a broken gzip body
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let head = match self.head.take() {
            Some(head) => head,
            None => match self.header_decoder.decode_eof(src)? {
                Some(head) => head,
                None => return Ok(None),
            },
        };

        let raw_body = src.split();
        trace!(len = raw_body.len(), "read response body until eof");

        // chunk reassembly strictly precedes decompression
        let body = TransferDecoder::from_headers(head.headers()).decode(raw_body)?;
        let body = ContentDecoder::from_headers(head.headers()).decode(body)?;

        Ok(Some(RawResponse::new(head, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use http::StatusCode;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn chunked(data: &[u8], chunk_size: usize) -> Vec<u8> {
        let mut encoded = Vec::new();
        for chunk in data.chunks(chunk_size) {
            encoded.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            encoded.extend_from_slice(chunk);
            encoded.extend_from_slice(b"\r\n");
        }
        encoded.extend_from_slice(b"0\r\n\r\n");
        encoded
    }

    fn decode_all(bytes: &[u8]) -> Result<RawResponse, ParseError> {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from(bytes);
        assert!(decoder.decode(&mut buf)?.is_none());
        Ok(decoder.decode_eof(&mut buf)?.expect("response at eof"))
    }

    #[test]
    fn plain_body() {
        let response = decode_all(b"HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\n\r\n<h1>gone</h1>").unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.reason(), "Not Found");
        assert_eq!(&response.body()[..], b"<h1>gone</h1>");
    }

    #[test]
    fn chunked_then_gzip() {
        let html = b"<html><body>compressed and chunked</body></html>".repeat(20);
        let compressed = gzip(&html);

        let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Encoding: gzip\r\n\r\n".to_vec();
        raw.extend_from_slice(&chunked(&compressed, 7));

        let response = decode_all(&raw).unwrap();
        assert_eq!(&response.body()[..], &html[..]);
    }

    #[test]
    fn gzip_only() {
        let mut raw = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\n".to_vec();
        raw.extend_from_slice(&gzip(b"hello gzip"));

        let response = decode_all(&raw).unwrap();
        assert_eq!(&response.body()[..], b"hello gzip");
    }

    #[test]
    fn gzip_inside_chunks_is_not_gzip_framing() {
        // gzip applied to the chunk framing instead of the payload must not decode
        let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Encoding: gzip\r\n\r\n".to_vec();
        raw.extend_from_slice(&gzip(&chunked(b"payload", 3)));

        assert!(matches!(decode_all(&raw), Err(ParseError::MalformedChunkedBody { .. })));
    }

    #[test]
    fn body_bytes_from_head_read_are_kept() {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\n\r\nfirst ");

        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(decoder.head().is_some());

        buf.extend_from_slice(b"second");
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        let response = decoder.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(&response.body()[..], b"first second");
    }

    #[test]
    fn empty_stream_is_truncated() {
        let mut decoder = ResponseDecoder::new();
        let result = decoder.decode_eof(&mut BytesMut::new());
        assert!(matches!(result, Err(ParseError::TruncatedHeaders { received: 0 })));
    }

    #[test]
    fn unusable_header_lines_do_not_fail_the_response() {
        let response = decode_all(b"HTTP/1.1 200 OK\r\nX-Caf\xe9: v\r\nX-Id: a\x01b\r\n\r\nhello").unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-caf\u{fffd}").is_none());
        assert_eq!(response.headers().get("x-id").unwrap(), "ab");
        assert_eq!(&response.body()[..], b"hello");
    }

    #[test]
    fn chunked_body_closed_after_last_chunk() {
        let response = decode_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n").unwrap();
        assert_eq!(&response.body()[..], b"hello");
    }

    #[test]
    fn broken_gzip() {
        let result = decode_all(b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\nnot gzip at all");
        assert!(matches!(result, Err(ParseError::DecompressionFailed { .. })));
    }

    #[test]
    fn broken_chunks() {
        let result = decode_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nhello\r\n0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MalformedChunkedBody { .. })));
    }
}
