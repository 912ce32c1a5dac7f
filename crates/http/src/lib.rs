//! A blocking micro HTTP/1.1 fetcher
//!
//! This crate fetches a single web document over a raw byte stream: it parses the URL,
//! opens a plaintext or TLS connection, sends one `GET` request, frames the response
//! off the stream, undoes `chunked` transfer encoding and `gzip` content encoding,
//! follows redirects with a bounded hop count and finally sniffs the text encoding of
//! the body.
//!
//! # Features
//!
//! - HTTP/1.1 `GET` with `Connection: close` framing
//! - Chunked transfer decoding
//! - Gzip content decoding
//! - Redirect following (absolute and path-absolute `Location`)
//! - Encoding sniffing with a single-byte fallback
//! - `data:` and `file:` passthrough
//! - Pluggable byte transport
//!
//! # Example
//!
//! ```no_run
//! use micro_fetch_http::client::Client;
//! use micro_fetch_http::protocol::ParsedUrl;
//!
//! let client = Client::builder().max_redirects(5).build();
//! let url: ParsedUrl = "https://example.org/".parse().unwrap();
//!
//! let page = client.fetch(&url).unwrap();
//! println!("{:?} {}", page.status(), page.document().encoding());
//! println!("{}", page.document().text());
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: URL, response, document and error types
//! - [`codec`]: request encoding and response decoding
//! - [`connection`]: byte transports and the request/response exchange
//! - [`client`]: the fetch pipeline and the redirect controller
//! - [`charset`]: text encoding detection and decoding
//!
//! # Core Components
//!
//! ## Response Decoding
//!
//! [`codec::ResponseDecoder`] implements `tokio_util::codec::Decoder`. The head is
//! decoded as soon as the `\r\n\r\n` separator arrives; the body is delimited by the
//! end of the stream, so the complete response is produced by `decode_eof`. Chunk
//! reassembly always runs before gzip decompression.
//!
//! ## Transport
//!
//! [`connection::Connector`] opens streams and upgrades them to TLS. The default
//! [`connection::TcpConnector`] validates certificates against the webpki roots.
//! Streams are plain `std::io::Read + Write` values and are closed when dropped.
//!
//! ## Error Handling
//!
//! - [`protocol::FetchError`]: Top-level error type
//! - [`protocol::UrlError`]: URL parsing errors
//! - [`protocol::ParseError`]: Response framing errors
//!
//! # Limitations
//!
//! - One request per connection, no keep-alive
//! - No read timeout: a stalled peer blocks the fetch
//! - Relative-path and protocol-relative redirects are not resolved
//! - Maximum header size: 64KB by default

pub mod charset;
pub mod client;
pub mod codec;
pub mod connection;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
