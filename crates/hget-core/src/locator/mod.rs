//! Locator handling: parsing, working copies, the `source//subdir` split
//! and local file names derived from URLs.

mod filename;
mod subdir;

pub use filename::{filename_for, sanitize_filename};
pub use subdir::split_subdir;

use crate::error::{FetchError, Result};
use url::Url;

/// Parses a locator string into a URL.
pub fn parse(locator: &str) -> Result<Url> {
    Url::parse(locator).map_err(|err| FetchError::InvalidUrl {
        url: locator.to_string(),
        err,
    })
}

/// Returns the first value of query parameter `key`, if any.
pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Appends `key=value` to the query string, keeping existing pairs.
pub fn append_query(url: &mut Url, key: &str, value: &str) {
    url.query_pairs_mut().append_pair(key, value);
}

/// Drops every `key` pair from the query string; removes the query entirely
/// when nothing else is left. Other segments are kept exactly as written, and
/// a query without `key` is not touched at all.
pub fn remove_query(url: &mut Url, key: &str) {
    let Some(query) = url.query() else {
        return;
    };
    let names_key = |segment: &str| {
        url::form_urlencoded::parse(segment.as_bytes())
            .next()
            .is_some_and(|(k, _)| k == key)
    };
    if !query.split('&').any(names_key) {
        return;
    }

    let kept = query
        .split('&')
        .filter(|segment| !names_key(*segment))
        .collect::<Vec<_>>()
        .join("&");
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&kept));
    }
}
