//! Redirect controller
//!
//! Decides, for each response, whether the fetch goes on to another url. Redirects are
//! followed iteratively by [`crate::client::Client`], every hop on a new connection.

use tracing::debug;

use crate::protocol::{FetchError, ParsedUrl, RawResponse};

/// Default limit of redirects followed for a single fetch
pub const MAX_REDIRECTS: u32 = 10;

/// Text of the document returned when the redirect limit is reached
pub const TOO_MANY_REDIRECTS: &str = "Too many redirects.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Fetch this url next.
    Follow(ParsedUrl),
    /// The response is a redirect but the hop limit is used up.
    Exhausted,
    /// The response is the final one.
    Terminal,
}

/// Decides what follows `response`, which was fetched from `current`.
///
/// Only a 3xx status with a `location` header redirects. The next url carries
/// `current.redirect_hops() + 1` hops and the view-source flag of `current`. When that
/// count exceeds `max_redirects` the result is [`Redirect::Exhausted`].
///
/// # Errors
///
/// [`FetchError::UnsupportedRedirect`] when the location can't be resolved or points
/// to something other than `http`/`https`, [`FetchError::Url`] when an absolute
/// location doesn't parse.
pub fn decide(current: &ParsedUrl, response: &RawResponse, max_redirects: u32) -> Result<Redirect, FetchError> {
    let Some(location) = response.head().redirect_location() else {
        return Ok(Redirect::Terminal);
    };

    let next_hops = current.redirect_hops() + 1;
    if next_hops > max_redirects {
        debug!(location = %location, hops = current.redirect_hops(), max_redirects, "redirect limit reached");
        return Ok(Redirect::Exhausted);
    }

    let next = resolve_location(current, &location)?.with_redirect_hops(next_hops).with_view_source(current.view_source());
    Ok(Redirect::Follow(next))
}

/// Resolves a `location` header value against `current`.
///
/// - a value containing `://` is parsed on its own
/// - a value starting with a single `/` replaces the path of `current`
/// - everything else is unsupported
fn resolve_location(current: &ParsedUrl, location: &str) -> Result<ParsedUrl, FetchError> {
    let resolved = if location.contains("://") {
        ParsedUrl::parse(location)?
    } else if location.starts_with('/') && !location.starts_with("//") {
        let network = current.as_network().ok_or_else(|| FetchError::unsupported_redirect(location))?;
        ParsedUrl::parse(&format!("{}{}", network.origin(), location))?
    } else {
        return Err(FetchError::unsupported_redirect(location));
    };

    // a server must not send us to local files
    if !resolved.scheme().is_network() || resolved.view_source() {
        return Err(FetchError::unsupported_redirect(location));
    }

    Ok(resolved)
}
