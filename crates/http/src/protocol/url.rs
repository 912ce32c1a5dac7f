//! URL parsing for the fetcher.
//!
//! A [`ParsedUrl`] is a tagged value: network targets (`http`, `https`) carry a host,
//! port and path, `file:` targets carry only a path and `data:` targets carry their
//! inline payload. Parsing has no I/O side effects.
//!
//! Supported forms:
//!
//! - `http://host[:port][/path]` and `https://host[:port][/path]`
//! - `file://path`
//! - `data:[mediatype][;encoding],data`
//! - any of the non-data forms prefixed with `view-source:`

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::protocol::UrlError;

const VIEW_SOURCE_PREFIX: &str = "view-source:";
const DATA_PREFIX: &str = "data:";
const DEFAULT_MEDIATYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
        }
    }

    /// Default port of the scheme, only network schemes have one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::File | Scheme::Data => None,
        }
    }

    #[inline]
    pub fn is_network(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `http` or `https` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUrl {
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
}

impl NetworkUrl {
    /// Creates a network url, `scheme` must be `Http` or `Https`.
    pub fn new<H: Into<String>, P: Into<String>>(scheme: Scheme, host: H, port: u16, path: P) -> Result<Self, UrlError> {
        if !scheme.is_network() {
            return Err(UrlError::malformed(format!("{scheme} is not a network scheme")));
        }
        let host = host.into();
        if host.is_empty() {
            return Err(UrlError::malformed("missing host"));
        }
        Ok(Self { scheme, host, port, path: path.into() })
    }

    fn parse(scheme: Scheme, rest: &str) -> Result<Self, UrlError> {
        let (host_port, path) = rest.split_once('/').unwrap_or((rest, ""));
        let path = format!("/{path}");

        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    debug!(port, error = %e, "invalid port");
                    UrlError::invalid_port(port)
                })?;
                (host, port)
            }
            // network schemes always have a default port
            None => (host_port, scheme.default_port().unwrap_or(80)),
        };

        Self::new(scheme, host, port, path)
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// `scheme://host[:port]`, the port is only written when it isn't the scheme default.
    pub fn origin(&self) -> String {
        if Some(self.port) == self.scheme.default_port() {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

impl fmt::Display for NetworkUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.path)
    }
}

/// An inline `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mediatype: String,
    encoding: String,
    data: String,
}

impl DataUrl {
    fn parse(rest: &str) -> Result<Self, UrlError> {
        let (mediatype_and_encoding, data) =
            rest.split_once(',').ok_or_else(|| UrlError::malformed("data url without `,` separator"))?;

        let (mediatype, encoding) = mediatype_and_encoding.split_once(';').unwrap_or((mediatype_and_encoding, ""));
        let mediatype = if mediatype.is_empty() { DEFAULT_MEDIATYPE } else { mediatype };

        Ok(Self { mediatype: mediatype.to_string(), encoding: encoding.to_string(), data: data.to_string() })
    }

    pub fn mediatype(&self) -> &str {
        &self.mediatype
    }

    /// The parameter after `;`, empty when absent.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DATA_PREFIX)?;
        f.write_str(&self.mediatype)?;
        if !self.encoding.is_empty() {
            write!(f, ";{}", self.encoding)?;
        }
        write!(f, ",{}", self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Network(NetworkUrl),
    File { path: String },
    Data(DataUrl),
}

impl Target {
    pub fn scheme(&self) -> Scheme {
        match self {
            Target::Network(network) => network.scheme(),
            Target::File { .. } => Scheme::File,
            Target::Data(_) => Scheme::Data,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Network(network) => network.fmt(f),
            Target::File { path } => write!(f, "file://{path}"),
            Target::Data(data) => data.fmt(f),
        }
    }
}

/// A parsed URL together with the view-source intent and the redirect hops that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    target: Target,
    view_source: bool,
    redirect_hops: u32,
}

impl ParsedUrl {
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        if let Some(rest) = input.strip_prefix(DATA_PREFIX) {
            return Ok(Self::from_target(Target::Data(DataUrl::parse(rest)?)));
        }

        let (view_source, input) = match input.strip_prefix(VIEW_SOURCE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (scheme, rest) =
            input.split_once("://").ok_or_else(|| UrlError::malformed(format!("missing `://` in {input:?}")))?;

        let scheme = match scheme {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "file" => Scheme::File,
            other => return Err(UrlError::unknown_scheme(other)),
        };

        let rest = if rest.contains('/') { Cow::Borrowed(rest) } else { Cow::Owned(format!("{rest}/")) };

        let target = match scheme {
            Scheme::File => Target::File { path: rest.into_owned() },
            scheme => Target::Network(NetworkUrl::parse(scheme, &rest)?),
        };

        Ok(Self { target, view_source, redirect_hops: 0 })
    }

    pub fn from_target(target: Target) -> Self {
        Self { target, view_source: false, redirect_hops: 0 }
    }

    pub fn with_view_source(mut self, view_source: bool) -> Self {
        self.view_source = view_source;
        self
    }

    /// Stamps the hop count, only the redirect controller moves it forward.
    pub(crate) fn with_redirect_hops(mut self, redirect_hops: u32) -> Self {
        self.redirect_hops = redirect_hops;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn scheme(&self) -> Scheme {
        self.target.scheme()
    }

    pub fn as_network(&self) -> Option<&NetworkUrl> {
        match &self.target {
            Target::Network(network) => Some(network),
            _ => None,
        }
    }

    pub fn view_source(&self) -> bool {
        self.view_source
    }

    pub fn redirect_hops(&self) -> u32 {
        self.redirect_hops
    }
}

impl FromStr for ParsedUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.view_source {
            f.write_str(VIEW_SOURCE_PREFIX)?;
        }
        self.target.fmt(f)
    }
}
