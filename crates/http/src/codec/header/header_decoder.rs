//! Decoder for the head (status line and header fields) of an HTTP response
//!
//! The head ends at the first `\r\n\r\n`. Everything after it stays in the source
//! buffer as the beginning of the body.
//!
//! # Decoding rules
//!
//! - The head block is decoded as ASCII, any other byte is replaced by U+FFFD instead
//!   of failing the response
//! - The status line is `HTTP-version SP status-code SP reason`, the reason may be absent
//! - Header lines split at the first `:`, the name is trimmed and lowercased, the value
//!   trimmed; a repeated name keeps the last value
//! - A line without `:` fails the whole response
//! - A name that is not a valid token skips the line, bytes a header value cannot hold
//!   (control characters other than tab) are dropped from the value
//!
//! # Limits
//!
//! - The head must fit in `max_header_bytes`, 64KB by default

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::ensure;
use crate::protocol::{ParseError, ResponseHead};

/// Default size limit for the response head
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

const HEAD_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Decoder for response heads implementing the [`Decoder`] trait.
///
/// The decoder remembers how far it already scanned, so feeding the buffer one read at
/// a time never rescans old bytes for the separator.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    scanned: usize,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::with_max_header_bytes(DEFAULT_MAX_HEADER_BYTES)
    }

    pub fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self { max_header_bytes, scanned: 0 }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HeaderDecoder {
    type Item = ResponseHead;
    type Error = ParseError;

    /// Returns the head once the separator is in `src`, `None` while it is still missing.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TooLargeHeader`] when the head exceeds the size limit
    /// - [`ParseError::MalformedStatusLine`] and [`ParseError::MalformedHeader`] for
    ///   unparsable lines
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // the separator may straddle the previous scan boundary
        let from = self.scanned.saturating_sub(HEAD_SEPARATOR.len() - 1);

        let Some(position) = find_separator(&src[from..]) else {
            self.scanned = src.len();
            ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
            return Ok(None);
        };

        let head_len = from + position;
        ensure!(head_len <= self.max_header_bytes, ParseError::too_large_header(head_len, self.max_header_bytes));

        let head_bytes = src.split_to(head_len + HEAD_SEPARATOR.len());
        self.scanned = 0;
        trace!(head_size = head_len, remaining = src.len(), "found response head");

        parse_head(&head_bytes[..head_len]).map(Some)
    }

    /// A stream that ends before the separator never delivered a complete head.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(head) => Ok(Some(head)),
            None => Err(ParseError::truncated_headers(src.len())),
        }
    }
}

fn find_separator(bytes: &[u8]) -> Option<usize> {
    bytes.windows(HEAD_SEPARATOR.len()).position(|window| window == HEAD_SEPARATOR)
}

/// ASCII decoding that substitutes U+FFFD for every non-ASCII byte.
fn decode_ascii_lossy(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER }).collect()
}

fn parse_head(bytes: &[u8]) -> Result<ResponseHead, ParseError> {
    let text = decode_ascii_lossy(bytes);
    let mut lines = text.split("\r\n");

    let (status, reason) = parse_status_line(lines.next().unwrap_or_default())?;

    let mut headers = HeaderMap::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        if let Some((name, value)) = parse_header_line(line)? {
            headers.insert(name, value);
        }
    }

    Ok(ResponseHead::new(status, reason, headers))
}

fn parse_status_line(line: &str) -> Result<(StatusCode, &str), ParseError> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();
    let reason = parts.next().unwrap_or_default();

    ensure!(version.starts_with("HTTP/"), ParseError::malformed_status_line(line));
    let status = StatusCode::from_bytes(code.as_bytes()).map_err(|e| {
        trace!(code, error = %e, "invalid status code");
        ParseError::malformed_status_line(line)
    })?;

    Ok((status, reason.trim()))
}

/// Splits a header line, `None` when the line cannot be stored in a [`HeaderMap`].
fn parse_header_line(line: &str) -> Result<Option<(HeaderName, HeaderValue)>, ParseError> {
    let (name, value) = line.split_once(':').ok_or_else(|| ParseError::malformed_header(format!("no colon in {line:?}")))?;

    let name = name.trim().to_ascii_lowercase();
    let name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(name) => name,
        Err(e) => {
            debug!(name = %name, error = %e, "skipping header with invalid name");
            return Ok(None);
        }
    };

    let value: Vec<u8> = value.trim().bytes().filter(|&b| b == b'\t' || (b >= 0x20 && b != 0x7f)).collect();
    match HeaderValue::from_bytes(&value) {
        Ok(value) => Ok(Some((name, value))),
        Err(e) => {
            debug!(name = %name, error = %e, "skipping header with invalid value");
            Ok(None)
        }
    }
}
