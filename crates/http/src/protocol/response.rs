//! HTTP response types produced by the response decoder.
//!
//! A [`ResponseHead`] holds the status line and the header map, a [`RawResponse`] adds
//! the body after transfer and content decoding. The body is still binary: text decoding
//! is left to [`crate::charset`] so that redirect bodies, which are thrown away, never
//! pay for it.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};

/// Status line and headers of a response.
///
/// Header names are lowercase and unique, a repeated name keeps the last value.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new<S: Into<String>>(status: StatusCode, reason: S, headers: HeaderMap) -> Self {
        Self { status, reason: reason.into(), headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase as sent by the server, may be empty.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `location` header of a 3xx response, `None` for every other status.
    pub fn redirect_location(&self) -> Option<String> {
        if !self.status.is_redirection() {
            return None;
        }
        self.headers.get(header::LOCATION).map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }
}

/// A complete response whose body went through chunked and gzip decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    head: ResponseHead,
    body: Bytes,
}

impl RawResponse {
    pub fn new(head: ResponseHead, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn reason(&self) -> &str {
        &self.head.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (ResponseHead, Bytes) {
        (self.head, self.body)
    }
}
