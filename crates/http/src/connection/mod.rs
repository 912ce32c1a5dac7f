//! Connection handling module
//!
//! This module owns the byte streams a fetch runs over and drives a single
//! request/response exchange on them.
//!
//! # Components
//!
//! - [`Connector`]: Opens streams and upgrades them to TLS
//!   - [`TcpConnector`]: Blocking TCP with rustls and the webpki root certificates
//!
//! - [`HttpConnection`]: Exchange driver that:
//!   - Writes the encoded request head
//!   - Reads until the peer closes the stream
//!   - Feeds the bytes through [`crate::codec::ResponseDecoder`]
//!   - Closes the stream when the exchange ends, on success or failure

mod http_connection;
mod transport;

pub use http_connection::DEFAULT_READ_BUFFER_SIZE;
pub use http_connection::HttpConnection;
pub use transport::Connector;
pub use transport::MaybeTlsStream;
pub use transport::TcpConnector;
