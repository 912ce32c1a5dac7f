//! Selection and application of the transfer coding of a response body.

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::protocol::ParseError;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, header};
use tracing::debug;

/// Undoes the transfer coding of a fully buffered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Reassemble `chunked` framing
    Chunked(ChunkedDecoder),

    /// The body is delimited by the connection close and used as is
    Identity,
}

impl TransferDecoder {
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn identity() -> Self {
        Self { kind: Kind::Identity }
    }

    /// Picks the decoder from the `transfer-encoding` header, only an exact
    /// (case-insensitive) `chunked` value selects chunked decoding.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(header::TRANSFER_ENCODING) {
            Some(value) if value.as_bytes().eq_ignore_ascii_case(b"chunked") => Self::chunked(),
            Some(value) => {
                debug!(transfer_encoding = ?value, "unsupported transfer encoding, read body as is");
                Self::identity()
            }
            None => Self::identity(),
        }
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn decode(self, mut body: BytesMut) -> Result<Bytes, ParseError> {
        match self.kind {
            Kind::Chunked(decoder) => decoder.decode_all(&mut body),
            Kind::Identity => Ok(body.freeze()),
        }
    }
}
