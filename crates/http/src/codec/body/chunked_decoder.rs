//! Decoder for the HTTP chunked transfer coding.
//!
//! See [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//! Each chunk is a hexadecimal size line (optionally followed by extensions), the chunk
//! data and a CRLF. A zero-sized chunk ends the body; trailer fields after it are
//! read and discarded.

use crate::protocol::{ParseError, PayloadItem};
use ChunkedState::*;
use bytes::{Buf, Bytes, BytesMut};
use std::task::Poll;
use tokio_util::codec::Decoder;
use tracing::trace;

/// A state machine decoder for chunked bodies.
///
/// Every call to [`Decoder::decode`] returns at most one piece of chunk data, so a
/// single chunk may be handed out in several pieces when it arrives split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: SizeStart, remaining_size: 0 }
    }

    /// Reassembles a fully buffered chunked body.
    ///
    /// Running out of input before the zero-sized chunk is a framing error. Once the
    /// zero-sized chunk is read the body is complete, so missing trailers or a missing
    /// final CRLF are tolerated and bytes after the terminating CRLF are ignored.
    pub fn decode_all(mut self, src: &mut BytesMut) -> Result<Bytes, ParseError> {
        let mut body = BytesMut::with_capacity(src.len());
        loop {
            match self.decode(src)? {
                Some(PayloadItem::Chunk(bytes)) => body.extend_from_slice(&bytes),
                Some(PayloadItem::Eof) => return Ok(body.freeze()),
                None if self.state.after_last_chunk() => {
                    trace!(state = ?self.state, "body ended after the last chunk");
                    return Ok(body.freeze());
                }
                None => {
                    return Err(ParseError::malformed_chunked_body(format!(
                        "body ended in state {:?} before the last chunk",
                        self.state
                    )));
                }
            }
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// First hex digit of the chunk size
    SizeStart,
    /// Further hex digits of the chunk size
    Size,
    /// Whitespace after the size
    SizeLws,
    /// Chunk extensions, ignored
    Extension,
    /// LF closing the size line
    SizeLf,
    /// Chunk data
    Body,
    /// CR after chunk data
    BodyCr,
    /// LF after chunk data
    BodyLf,
    /// A trailer field, ignored
    Trailer,
    /// LF closing a trailer field
    TrailerLf,
    /// CR of the final empty line, or the first byte of a trailer field
    EndCr,
    /// LF of the final empty line
    EndLf,
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Returns `Some(Chunk)` for a piece of data, `Some(Eof)` once the last chunk and
    /// trailers are consumed and `None` when more input is needed.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let mut buf = None;

            self.state = match self.state.step(src, &mut self.remaining_size, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(reason)) => return Err(ParseError::malformed_chunked_body(reason)),
            };

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }
        }
    }
}

type Step = Poll<Result<ChunkedState, &'static str>>;

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.has_remaining() {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

impl ChunkedState {
    fn step(&self, src: &mut BytesMut, remaining_size: &mut u64, buf: &mut Option<Bytes>) -> Step {
        match self {
            SizeStart => ChunkedState::read_size_start(src, remaining_size),
            Size => ChunkedState::read_size(src, remaining_size),
            SizeLws => ChunkedState::read_size_lws(src),
            Extension => ChunkedState::read_extension(src),
            SizeLf => ChunkedState::read_size_lf(src, remaining_size),
            Body => ChunkedState::read_body(src, remaining_size, buf),
            BodyCr => ChunkedState::expect(src, b'\r', BodyLf, "missing CR after chunk data"),
            BodyLf => ChunkedState::expect(src, b'\n', SizeStart, "missing LF after chunk data"),
            Trailer => ChunkedState::read_trailer(src),
            TrailerLf => ChunkedState::expect(src, b'\n', EndCr, "missing LF after trailer field"),
            EndCr => ChunkedState::read_end_cr(src),
            EndLf => ChunkedState::expect(src, b'\n', End, "missing LF after last chunk"),
            End => Poll::Ready(Ok(End)),
        }
    }

    fn after_last_chunk(self) -> bool {
        matches!(self, Trailer | TrailerLf | EndCr | EndLf)
    }

    /// A size line must start with at least one hex digit.
    fn read_size_start(src: &mut BytesMut, size: &mut u64) -> Step {
        match hex_digit(try_next_byte!(src)) {
            Some(digit) => {
                *size = u64::from(digit);
                Poll::Ready(Ok(Size))
            }
            None => Poll::Ready(Err("chunk size is not a hex number")),
        }
    }

    /// Accumulates one hex digit of the chunk size, or moves on at a delimiter.
    fn read_size(src: &mut BytesMut, size: &mut u64) -> Step {
        let digit = match try_next_byte!(src) {
            b'\t' | b' ' => return Poll::Ready(Ok(SizeLws)),
            b';' => return Poll::Ready(Ok(Extension)),
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            b => match hex_digit(b) {
                Some(digit) => digit,
                None => return Poll::Ready(Err("chunk size is not a hex number")),
            },
        };

        match size.checked_mul(16).and_then(|size| size.checked_add(u64::from(digit))) {
            Some(new_size) => {
                *size = new_size;
                Poll::Ready(Ok(Size))
            }
            None => Poll::Ready(Err("chunk size overflow")),
        }
    }

    fn read_size_lws(src: &mut BytesMut) -> Step {
        // no more digits may follow the whitespace
        match try_next_byte!(src) {
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => Poll::Ready(Err("invalid whitespace in chunk size line")),
        }
    }

    fn read_extension(src: &mut BytesMut) -> Step {
        // extensions end at CRLF, a bare LF is rejected
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => Poll::Ready(Err("chunk extension contains a bare LF")),
            _ => Poll::Ready(Ok(Extension)),
        }
    }

    fn read_size_lf(src: &mut BytesMut, size: &mut u64) -> Step {
        match try_next_byte!(src) {
            b'\n' if *size == 0 => Poll::Ready(Ok(EndCr)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => Poll::Ready(Err("missing LF after chunk size")),
        }
    }

    fn read_body(src: &mut BytesMut, size: &mut u64, buf: &mut Option<Bytes>) -> Step {
        if src.is_empty() {
            return Poll::Pending;
        }

        let remaining = usize::try_from(*size).unwrap_or(usize::MAX);
        let read_size = remaining.min(src.len());

        *size -= read_size as u64;
        *buf = Some(src.split_to(read_size).freeze());

        if *size > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    fn read_trailer(src: &mut BytesMut) -> Step {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(TrailerLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_end_cr(src: &mut BytesMut) -> Step {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(EndLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn expect(src: &mut BytesMut, expected: u8, next: ChunkedState, reason: &'static str) -> Step {
        if try_next_byte!(src) == expected { Poll::Ready(Ok(next)) } else { Poll::Ready(Err(reason)) }
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b + 10 - b'a'),
        b'A'..=b'F' => Some(b + 10 - b'A'),
        _ => None,
    }
}
