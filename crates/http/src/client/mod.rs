//! The fetch pipeline
//!
//! [`Client::fetch`] turns a [`ParsedUrl`] into a [`Page`]:
//!
//! - `data:` targets return their inline payload
//! - `file:` targets read the file and decode it with [`crate::charset`]
//! - `http`/`https` targets run request/response exchanges, one connection each,
//!   until [`redirect::decide`] reports a terminal response or the redirect limit
//!
//! # Example
//!
//! ```no_run
//! use micro_fetch_http::client::Client;
//!
//! let client = Client::builder().build();
//! let page = client.fetch(&"http://example.org/".parse().unwrap()).unwrap();
//! assert_eq!(page.status(), Some(http::StatusCode::OK));
//! ```

mod builder;
pub mod redirect;

pub use builder::ClientBuilder;
pub use builder::DEFAULT_USER_AGENT;

use std::fs;

use http::{HeaderMap, HeaderValue, header};
use tracing::{debug, info, warn};

use crate::charset;
use crate::codec::GetRequest;
use crate::connection::{Connector, HttpConnection, TcpConnector};
use crate::protocol::{DataUrl, Document, FetchError, NetworkUrl, Page, ParsedUrl, RawResponse, Target};
use redirect::{Redirect, TOO_MANY_REDIRECTS};

/// Encoding name reported for `data:` documents and placeholder documents
const INLINE_ENCODING: &str = "UTF-8";

/// A blocking web document fetcher.
///
/// # Type Parameters
///
/// * `C`: The [`Connector`] that opens streams, [`TcpConnector`] by default
#[derive(Debug)]
pub struct Client<C = TcpConnector> {
    connector: C,
    max_redirects: u32,
    user_agent: String,
    read_buffer_size: usize,
    max_header_bytes: usize,
}

impl Client<TcpConnector> {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<C: Connector> Client<C> {
    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetches `url`, following redirects.
    ///
    /// Non-2xx statuses are not errors, they come back as ordinary pages. Running out of
    /// redirects isn't either: the page then holds the last redirect response's status
    /// and headers and a placeholder document.
    pub fn fetch(&self, url: &ParsedUrl) -> Result<Page, FetchError> {
        match url.target() {
            Target::Data(data) => Ok(fetch_data(url, data)),
            Target::File { path } => fetch_file(url, path),
            Target::Network(_) => self.fetch_network(url.clone()),
        }
    }

    fn fetch_network(&self, url: ParsedUrl) -> Result<Page, FetchError> {
        let mut current = url;

        loop {
            let Some(network) = current.as_network() else {
                return Err(FetchError::unsupported_redirect(current.to_string()));
            };

            let response = self.exchange(network)?;

            match redirect::decide(&current, &response, self.max_redirects)? {
                Redirect::Follow(next) => {
                    info!(status = %response.status(), from = %current, to = %next, hops = next.redirect_hops(), "following redirect");
                    current = next;
                }
                Redirect::Exhausted => {
                    warn!(status = %response.status(), url = %current, max_redirects = self.max_redirects, "too many redirects");
                    let document = Document::new(INLINE_ENCODING, TOO_MANY_REDIRECTS, current.view_source());
                    let (head, _) = response.into_parts();
                    return Ok(Page::new(current, Some(head.status()), head.headers().clone(), document));
                }
                Redirect::Terminal => {
                    let (head, body) = response.into_parts();
                    let document = charset::decode_document(&body, current.view_source());
                    return Ok(Page::new(current, Some(head.status()), head.headers().clone(), document));
                }
            }
        }
    }

    /// One request/response cycle on a fresh connection.
    fn exchange(&self, url: &NetworkUrl) -> Result<RawResponse, FetchError> {
        let (host, port) = (url.host(), url.port());

        let mut stream = self.connector.connect(host, port).map_err(|e| FetchError::connect(host, port, e))?;
        if url.is_tls() {
            stream = self.connector.upgrade_tls(stream, host).map_err(|e| FetchError::tls(host, e))?;
        }

        let mut connection = HttpConnection::with_capacity(stream, self.read_buffer_size, self.max_header_bytes);
        connection.send(GetRequest { host, path: url.path(), user_agent: &self.user_agent })?;

        let response = connection.read_response()?;
        debug!(url = %url, status = %response.status(), body_len = response.body().len(), "exchange finished");
        Ok(response)
    }
}

fn fetch_data(url: &ParsedUrl, data: &DataUrl) -> Page {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(data.mediatype()) {
        headers.insert(header::CONTENT_TYPE, value);
    }

    let document = Document::new(INLINE_ENCODING, data.data(), url.view_source());
    Page::new(url.clone(), None, headers, document)
}

fn fetch_file(url: &ParsedUrl, path: &str) -> Result<Page, FetchError> {
    let bytes = fs::read(path).map_err(|e| FetchError::file(path, e))?;
    debug!(path, len = bytes.len(), "read local file");

    let document = charset::decode_document(&bytes, url.view_source());
    Ok(Page::new(url.clone(), None, HeaderMap::new(), document))
}
