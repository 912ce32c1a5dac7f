use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("url error: {source}")]
    Url {
        #[from]
        source: UrlError,
    },

    #[error("response error: {source}")]
    Response {
        #[from]
        source: ParseError,
    },

    #[error("can't connect to {host}:{port}: {source}")]
    Connect { host: String, port: u16, source: io::Error },

    #[error("tls handshake with {server_name} failed: {source}")]
    Tls { server_name: String, source: io::Error },

    #[error("send request error: {source}")]
    Send { source: io::Error },

    #[error("can't read file {path}: {source}")]
    File { path: String, source: io::Error },

    #[error("unsupported redirect location: {location}")]
    UnsupportedRedirect { location: String },
}

impl FetchError {
    pub fn connect<S: ToString>(host: S, port: u16, source: io::Error) -> Self {
        Self::Connect { host: host.to_string(), port, source }
    }

    pub fn tls<S: ToString>(server_name: S, source: io::Error) -> Self {
        Self::Tls { server_name: server_name.to_string(), source }
    }

    pub fn send<E: Into<io::Error>>(e: E) -> Self {
        Self::Send { source: e.into() }
    }

    pub fn file<S: ToString>(path: S, source: io::Error) -> Self {
        Self::File { path: path.to_string(), source }
    }

    pub fn unsupported_redirect<S: ToString>(location: S) -> Self {
        Self::UnsupportedRedirect { location: location.to_string() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("unknown scheme {scheme}")]
    UnknownScheme { scheme: String },

    #[error("malformed url: {reason}")]
    Malformed { reason: String },

    #[error("invalid port {port:?}")]
    InvalidPort { port: String },
}

impl UrlError {
    pub fn unknown_scheme<S: ToString>(scheme: S) -> Self {
        Self::UnknownScheme { scheme: scheme.to_string() }
    }

    pub fn malformed<S: ToString>(str: S) -> Self {
        Self::Malformed { reason: str.to_string() }
    }

    pub fn invalid_port<S: ToString>(port: S) -> Self {
        Self::InvalidPort { port: port.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("connection closed before headers were received, {received} bytes read")]
    TruncatedHeaders { received: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("malformed chunked body: {reason}")]
    MalformedChunkedBody { reason: String },

    #[error("gzip decompression failed: {source}")]
    DecompressionFailed { source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn truncated_headers(received: usize) -> Self {
        Self::TruncatedHeaders { received }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn malformed_status_line<S: ToString>(line: S) -> Self {
        Self::MalformedStatusLine { line: line.to_string() }
    }

    pub fn malformed_header<S: ToString>(str: S) -> Self {
        Self::MalformedHeader { reason: str.to_string() }
    }

    pub fn malformed_chunked_body<S: ToString>(str: S) -> Self {
        Self::MalformedChunkedBody { reason: str.to_string() }
    }

    pub fn decompression_failed<E: Into<io::Error>>(e: E) -> Self {
        Self::DecompressionFailed { source: e.into() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
