use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use flate2::Compression;
use flate2::write::GzEncoder;
use micro_fetch_http::codec::{GetRequest, HeaderDecoder, ResponseDecoder};
use micro_fetch_http::connection::HttpConnection;
use std::hint::black_box;
use std::io;
use std::io::{Cursor, Read, Write};
use tokio_util::codec::Decoder;

// Mock IO for testing
struct MockIO {
    read_data: Cursor<Vec<u8>>,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data: Cursor::new(read_data) }
    }
}

impl Read for MockIO {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_data.read(buf)
    }
}

impl Write for MockIO {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\nServer: nginx\r\nDate: Mon, 02 Jun 2025 08:00:00 GMT\r\nContent-Type: text/html; charset=utf-8\r\nTransfer-Encoding: chunked\r\nContent-Encoding: gzip\r\nConnection: close\r\n\r\n";

fn chunked_gzip_response() -> Vec<u8> {
    let html = b"<html><body><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p></body></html>".repeat(64);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&html).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut response = HEAD.to_vec();
    for chunk in compressed.chunks(512) {
        response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        response.extend_from_slice(chunk);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(b"0\r\n\r\n");
    response
}

fn bench_header_decoder(c: &mut Criterion) {
    c.bench_function("decode_response_head", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new();
            let mut bytes = BytesMut::from(HEAD);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_response_decoder(c: &mut Criterion) {
    let response = chunked_gzip_response();

    c.bench_function("decode_chunked_gzip_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::new();
            let mut bytes = BytesMut::from(&response[..]);
            decoder.decode(&mut bytes).unwrap();
            black_box(decoder.decode_eof(&mut bytes).unwrap());
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let response = chunked_gzip_response();
    let request = GetRequest { host: "localhost", path: "/", user_agent: "bench" };

    c.bench_function("exchange_chunked_gzip_response", |b| {
        b.iter(|| {
            let mut connection = HttpConnection::new(MockIO::new(response.clone()));
            connection.send(request).unwrap();
            black_box(connection.read_response().unwrap());
        });
    });
}

criterion_group!(benches, bench_header_decoder, bench_response_decoder, bench_http_connection);
criterion_main!(benches);
