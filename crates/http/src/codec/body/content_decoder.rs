//! Content decoding of response bodies.
//!
//! Only `gzip` is requested (`Accept-Encoding: gzip`), so it is the only coding that
//! gets undone; any other coding is passed through untouched.

use crate::protocol::ParseError;
use bytes::Bytes;
use flate2::read::GzDecoder;
use http::{HeaderMap, header};
use std::io::Read;
use tracing::{debug, trace};

/// Represents the content coding of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDecoder {
    /// Gzip decoding.
    Gzip,
    /// The body is not content coded, or coded with something we didn't ask for.
    Identity,
}

impl ContentDecoder {
    /// Selects a decoder from the `content-encoding` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(header::CONTENT_ENCODING) {
            Some(value) if value.as_bytes().eq_ignore_ascii_case(b"gzip") => Self::Gzip,
            Some(value) => {
                debug!(content_encoding = ?value, "unsupported content encoding, keep body as is");
                Self::Identity
            }
            None => Self::Identity,
        }
    }

    /// Returns the name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            ContentDecoder::Gzip => "gzip",
            ContentDecoder::Identity => "identity",
        }
    }

    /// Decodes the whole body.
    pub fn decode(self, body: Bytes) -> Result<Bytes, ParseError> {
        match self {
            Self::Gzip => {
                let mut decoded = Vec::with_capacity(body.len() * 4);
                GzDecoder::new(&body[..]).read_to_end(&mut decoded).map_err(|e| {
                    trace!("error decoding gzip encoding: {}", e);
                    ParseError::decompression_failed(e)
                })?;
                trace!(compressed = body.len(), decompressed = decoded.len(), "decoded gzip body");
                Ok(Bytes::from(decoded))
            }
            Self::Identity => Ok(body),
        }
    }
}
