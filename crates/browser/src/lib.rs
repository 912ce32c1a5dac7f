//! A micro text browser
//!
//! Fetches a page with [`micro_fetch_http`] and renders it as plain text: markup is
//! removed, only the `<body>` of ordinary pages is shown and the basic entities are
//! decoded. `view-source:` urls show the text of the whole document instead.
//!
//! # Example
//!
//! ```no_run
//! use micro_fetch_http::client::Client;
//!
//! let client = Client::builder().build();
//! let loaded = micro_browser::load(&client, &"https://example.org/".parse().unwrap()).unwrap();
//! println!("{}", loaded.text());
//! ```

pub mod render;

use micro_fetch_http::client::Client;
use micro_fetch_http::connection::Connector;
use micro_fetch_http::protocol::{FetchError, Page, ParsedUrl};
use tracing::debug;

/// A fetched page together with its rendered text.
#[derive(Debug)]
pub struct Loaded {
    page: Page,
    text: String,
}

impl Loaded {
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_parts(self) -> (Page, String) {
        (self.page, self.text)
    }
}

/// Fetches `url` with `client` and renders the resulting document.
pub fn load<C: Connector>(client: &Client<C>, url: &ParsedUrl) -> Result<Loaded, FetchError> {
    let page = client.fetch(url)?;
    let text = render::render(page.document());
    debug!(url = %page.url(), encoding = page.document().encoding(), len = text.len(), "rendered page");
    Ok(Loaded { page, text })
}
