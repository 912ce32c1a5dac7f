//! Core protocol types of the fetcher.
//!
//! # Architecture
//!
//! - **URLs** ([`url`]): [`ParsedUrl`] tagged over network, file and data targets
//! - **Responses** ([`response`]): [`ResponseHead`] and [`RawResponse`], the framed but
//!   not yet text-decoded response
//! - **Documents** ([`document`]): [`Document`], the decoded text, and [`Page`], the
//!   terminal result of a fetch
//! - **Payload items** ([`message`]): [`PayloadItem`] produced by the chunked decoder
//! - **Errors** ([`error`]): [`FetchError`], [`UrlError`] and [`ParseError`]
//!
//! Each stage owns its input and hands a new owned value to the next one, nothing
//! mutable is shared between stages.

mod message;
pub use message::PayloadItem;

mod url;
pub use url::DataUrl;
pub use url::NetworkUrl;
pub use url::ParsedUrl;
pub use url::Scheme;
pub use url::Target;

mod response;
pub use response::RawResponse;
pub use response::ResponseHead;

mod document;
pub use document::Document;
pub use document::Page;

mod error;
pub use error::FetchError;
pub use error::ParseError;
pub use error::UrlError;
