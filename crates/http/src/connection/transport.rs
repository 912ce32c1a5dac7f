//! Byte transports: plaintext TCP and TLS over TCP.
//!
//! A [`Connector`] opens a duplex byte stream to `(host, port)` and can upgrade it to
//! TLS in place. Streams are plain [`Read`] + [`Write`] values, a zero-length read is
//! end-of-stream and dropping the stream closes it.

use std::fmt;
use std::io;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use tracing::{debug, trace};

/// Opens byte streams for the fetcher.
pub trait Connector {
    type Stream: Read + Write;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;

    /// Wraps `stream` in TLS for `server_name`, validating the server certificate
    /// against it.
    fn upgrade_tls(&self, stream: Self::Stream, server_name: &str) -> io::Result<Self::Stream>;
}

/// The default [`Connector`]: blocking `TcpStream`s and rustls with the webpki roots.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    tls_config: Arc<ClientConfig>,
}

impl TcpConnector {
    pub fn new() -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder().with_root_certificates(root_store).with_no_client_auth();

        Self { tls_config: Arc::new(config) }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for TcpConnector {
    type Stream = MaybeTlsStream;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream> {
        debug!(host, port, "connecting");
        let stream = TcpStream::connect((host, port))?;
        Ok(MaybeTlsStream::Plain(stream))
    }

    fn upgrade_tls(&self, stream: Self::Stream, server_name: &str) -> io::Result<Self::Stream> {
        let mut tcp = match stream {
            MaybeTlsStream::Plain(tcp) => tcp,
            MaybeTlsStream::Tls(_) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, "stream is already upgraded to tls"));
            }
        };

        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, format!("invalid server name {server_name:?}: {e}")))?;
        let mut connection = ClientConnection::new(Arc::clone(&self.tls_config), name).map_err(io::Error::other)?;

        // finish the handshake here so certificate errors surface as tls errors
        while connection.is_handshaking() {
            connection.complete_io(&mut tcp)?;
        }
        debug!(server_name, version = ?connection.protocol_version(), "tls handshake finished");

        Ok(MaybeTlsStream::Tls(Box::new(StreamOwned::new(connection, tcp))))
    }
}

/// A TCP stream, possibly wrapped in TLS.
pub enum MaybeTlsStream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl fmt::Debug for MaybeTlsStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(stream) => f.debug_tuple("Plain").field(stream).finish(),
            Self::Tls(stream) => f
                .debug_struct("Tls")
                .field("stream", stream.get_ref())
                .field("protocol_version", &stream.conn.protocol_version())
                .finish_non_exhaustive(),
        }
    }
}

impl Read for MaybeTlsStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Tls(stream) => match stream.read(buf) {
                // many servers close the socket without close_notify after the response
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    trace!("tls peer closed without close_notify, treat as eof");
                    Ok(0)
                }
                result => result,
            },
        }
    }
}

impl Write for MaybeTlsStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn plain_connect_and_debug() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();

        let connector = TcpConnector::new();
        assert!(format!("{connector:?}").starts_with("TcpConnector"));

        let stream = connector.connect("127.0.0.1", port).unwrap();
        assert!(matches!(stream, MaybeTlsStream::Plain(_)));
        assert!(format!("{stream:?}").starts_with("Plain("));
    }

    #[test]
    fn invalid_server_name() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();

        let connector = TcpConnector::new();
        let stream = connector.connect("127.0.0.1", port).unwrap();
        let error = connector.upgrade_tls(stream, "not a host name!").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }
}
