use http::{HeaderMap, StatusCode};

use crate::protocol::ParsedUrl;

/// Decoded text of a terminal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    encoding: String,
    text: String,
    view_source: bool,
}

impl Document {
    pub fn new<E: Into<String>, T: Into<String>>(encoding: E, text: T, view_source: bool) -> Self {
        Self { encoding: encoding.into(), text: text.into(), view_source }
    }

    /// Name of the encoding the text was decoded with.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn view_source(&self) -> bool {
        self.view_source
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// The result of a fetch: the final url, the terminal response metadata and its document.
///
/// `status` is `None` for `file:` and `data:` targets. When the redirect limit is hit the
/// status and headers are those of the last redirect response and the document holds a
/// placeholder message.
#[derive(Debug, Clone)]
pub struct Page {
    url: ParsedUrl,
    status: Option<StatusCode>,
    headers: HeaderMap,
    document: Document,
}

impl Page {
    pub fn new(url: ParsedUrl, status: Option<StatusCode>, headers: HeaderMap, document: Document) -> Self {
        Self { url, status, headers, document }
    }

    pub fn url(&self) -> &ParsedUrl {
        &self.url
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
