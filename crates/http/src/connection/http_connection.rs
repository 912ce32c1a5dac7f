use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::codec::{DEFAULT_MAX_HEADER_BYTES, GetRequest, RequestEncoder, ResponseDecoder};
use crate::protocol::{FetchError, ParseError, RawResponse};

/// Default number of bytes asked from the stream per read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4 * 1024;

/// One request/response exchange over a blocking byte stream
///
/// The connection owns the stream. [`HttpConnection::read_response`] consumes the
/// connection, so the stream is dropped, and therefore closed, on every exit path.
///
/// # Type Parameters
///
/// * `S`: The blocking duplex stream type
#[derive(Debug)]
pub struct HttpConnection<S> {
    stream: S,
    decoder: ResponseDecoder,
    read_buf: BytesMut,
    read_size: usize,
}

impl<S> HttpConnection<S>
where
    S: Read + Write,
{
    pub fn new(stream: S) -> Self {
        Self::with_capacity(stream, DEFAULT_READ_BUFFER_SIZE, DEFAULT_MAX_HEADER_BYTES)
    }

    pub fn with_capacity(stream: S, read_size: usize, max_header_bytes: usize) -> Self {
        Self {
            stream,
            decoder: ResponseDecoder::with_max_header_bytes(max_header_bytes),
            read_buf: BytesMut::with_capacity(read_size),
            read_size: read_size.max(1),
        }
    }

    /// Writes the request head and flushes it.
    pub fn send(&mut self, request: GetRequest<'_>) -> Result<(), FetchError> {
        let mut write_buf = BytesMut::new();
        RequestEncoder::new().encode(request, &mut write_buf).map_err(FetchError::send)?;

        trace!(len = write_buf.len(), path = request.path, "sending request");
        self.stream.write_all(&write_buf).map_err(FetchError::send)?;
        self.stream.flush().map_err(FetchError::send)
    }

    /// Reads until the peer closes the stream and decodes the response.
    ///
    /// There is no timeout, a peer that never closes blocks this call forever.
    pub fn read_response(mut self) -> Result<RawResponse, ParseError> {
        loop {
            let read = self.fill_buf()?;

            if read == 0 {
                debug!(buffered = self.read_buf.len(), "stream reached eof");
                return match self.decoder.decode_eof(&mut self.read_buf)? {
                    Some(response) => Ok(response),
                    None => Err(ParseError::truncated_headers(self.read_buf.len())),
                };
            }

            // the body runs until eof, so decode only ever advances the head
            if let Some(response) = self.decoder.decode(&mut self.read_buf)? {
                return Ok(response);
            }
        }
    }

    /// Appends one read worth of bytes to the buffer, `0` means end-of-stream.
    fn fill_buf(&mut self) -> Result<usize, ParseError> {
        let filled = self.read_buf.len();
        self.read_buf.resize(filled + self.read_size, 0);

        let result = loop {
            match self.stream.read(&mut self.read_buf[filled..]) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                result => break result,
            }
        };

        let read = match result {
            Ok(read) => read,
            Err(e) => {
                self.read_buf.truncate(filled);
                return Err(ParseError::io(e));
            }
        };

        self.read_buf.truncate(filled + read);
        trace!(read, buffered = self.read_buf.len(), "read from stream");
        Ok(read)
    }

    /// Mutable access to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S> HttpConnection<S> {
    /// Gives the stream back without closing it.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::io;
    use std::io::Cursor;

    /// An in-memory stream that hands out at most `max_read` bytes per read.
    struct MockIO {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
        max_read: usize,
    }

    impl MockIO {
        fn new(read_data: &[u8], max_read: usize) -> Self {
            Self { read_data: Cursor::new(read_data.to_vec()), write_data: Vec::new(), max_read }
        }
    }

    impl Read for MockIO {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.max_read);
            self.read_data.read(&mut buf[..len])
        }
    }

    impl Write for MockIO {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails every read, used to check error propagation.
    struct BrokenIO;

    impl Read for BrokenIO {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    impl Write for BrokenIO {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const REQUEST: GetRequest<'static> = GetRequest { host: "example.org", path: "/", user_agent: "test" };

    #[test]
    fn sends_request_and_reads_response() {
        let response = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello world";
        let mut connection = HttpConnection::new(MockIO::new(response, usize::MAX));

        connection.send(REQUEST).unwrap();
        assert!(connection.get_mut().write_data.starts_with(b"GET / HTTP/1.1\r\nHost: example.org\r\n"));

        let response = connection.read_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], b"hello world");
    }

    #[test]
    fn byte_by_byte_reads() {
        let response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let connection = HttpConnection::with_capacity(MockIO::new(response, 1), 16, DEFAULT_MAX_HEADER_BYTES);

        let response = connection.read_response().unwrap();
        assert_eq!(&response.body()[..], b"hello world");
    }

    #[test]
    fn separator_within_first_read_keeps_body_start() {
        let response = b"HTTP/1.1 500 Internal Server Error\r\n\r\n<p>oops</p>";
        let connection = HttpConnection::with_capacity(MockIO::new(response, 1024), 1024, DEFAULT_MAX_HEADER_BYTES);

        let response = connection.read_response().unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&response.body()[..], b"<p>oops</p>");
    }

    #[test]
    fn closed_before_head() {
        let connection = HttpConnection::new(MockIO::new(b"HTTP/1.1 200 OK\r\nServ", 4));
        let result = connection.read_response();
        assert!(matches!(result, Err(ParseError::TruncatedHeaders { received: 21 })));
    }

    #[test]
    fn read_errors_propagate() {
        let result = HttpConnection::new(BrokenIO).read_response();
        assert!(matches!(result, Err(ParseError::Io { .. })));

        let result = HttpConnection::new(BrokenIO).send(REQUEST);
        assert!(matches!(result, Err(FetchError::Send { .. })));
    }
}
