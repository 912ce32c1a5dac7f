use crate::client::Client;
use crate::client::redirect::MAX_REDIRECTS;
use crate::codec::DEFAULT_MAX_HEADER_BYTES;
use crate::connection::{Connector, DEFAULT_READ_BUFFER_SIZE, TcpConnector};

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; micro-fetch/", env!("CARGO_PKG_VERSION"), ")");

/// Builder for [`Client`]
///
/// ```
/// use micro_fetch_http::client::Client;
///
/// let client = Client::builder().max_redirects(3).user_agent("my-agent/1.0").read_buffer_size(16 * 1024).build();
/// assert_eq!(client.max_redirects(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    max_redirects: u32,
    user_agent: String,
    read_buffer_size: usize,
    max_header_bytes: usize,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self {
            max_redirects: MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }

    /// Redirects followed before the fetch gives up with a placeholder document.
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    /// Builds a client on plain TCP and rustls.
    pub fn build(self) -> Client<TcpConnector> {
        self.build_with(TcpConnector::new())
    }

    pub fn build_with<C: Connector>(self, connector: C) -> Client<C> {
        Client {
            connector,
            max_redirects: self.max_redirects,
            user_agent: self.user_agent,
            read_buffer_size: self.read_buffer_size,
            max_header_bytes: self.max_header_bytes,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
