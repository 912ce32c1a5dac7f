//! Encoder for the request head.
//!
//! Every request is a bodyless `GET` that asks the server to close the connection
//! after the response and allows a gzip coded body:
//!
//! ```text
//! GET {path} HTTP/1.1\r\n
//! Host: {host}\r\n
//! Connection: close\r\n
//! User-Agent: {user agent}\r\n
//! Accept-Encoding: gzip\r\n
//! \r\n
//! ```

use bytes::{BufMut, BytesMut};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for the request head
const INIT_HEADER_SIZE: usize = 512;

/// The parts of a request that vary between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetRequest<'a> {
    pub host: &'a str,
    pub path: &'a str,
    pub user_agent: &'a str,
}

/// Encoder for [`GetRequest`] implementing the [`Encoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestEncoder;

impl RequestEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<GetRequest<'_>> for RequestEncoder {
    type Error = io::Error;

    fn encode(&mut self, request: GetRequest<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        write!(
            FastWrite(dst),
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nUser-Agent: {}\r\nAccept-Encoding: gzip\r\n\r\n",
            request.path,
            request.host,
            request.user_agent,
        )
    }
}

/// Adapts `BytesMut` to `io::Write` so `write!` can format straight into the buffer.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_wire_format() {
        let mut dst = BytesMut::new();
        let request = GetRequest { host: "example.org", path: "/index.html?q=1", user_agent: "test-agent/1.0" };

        RequestEncoder::new().encode(request, &mut dst).unwrap();

        assert_eq!(
            &dst[..],
            &b"GET /index.html?q=1 HTTP/1.1\r\nHost: example.org\r\nConnection: close\r\nUser-Agent: test-agent/1.0\r\nAccept-Encoding: gzip\r\n\r\n"[..]
        );
    }
}
