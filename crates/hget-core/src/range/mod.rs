//! Byte range directives and partial-content negotiation.
//!
//! A range is only attempted when the directive is valid *and* a HEAD probe
//! shows the server advertising `Accept-Ranges: bytes`. Every other outcome
//! degrades to a full transfer.

mod directive;

pub use directive::{
    parse_directive, range_from_url, RangeError, RangeErrorKind, RANGE_DIRECTIVE_PARAM,
};

use crate::http::HttpClient;

/// Requested byte range; `end` absent means "to end of content".
/// When `end` is present it is strictly greater than `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// `Range` header value: `bytes=<start>-<end-or-empty>`.
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Probes `url` with HEAD and reports whether a ranged GET should be sent.
///
/// Probe failures and servers without byte-range support are expected; they
/// return `false` and the caller downloads the whole file.
pub fn negotiate(client: &dyn HttpClient, url: &str, headers: &[(String, String)]) -> bool {
    match client.head(url, headers) {
        Ok(head) if head.is_success() => {
            if head.accepts_byte_ranges() {
                true
            } else {
                tracing::debug!("{} does not advertise byte ranges; full download", url);
                false
            }
        }
        Ok(head) => {
            tracing::debug!(
                "HEAD {} returned HTTP {}; falling back to full download",
                url,
                head.status
            );
            false
        }
        Err(e) => {
            tracing::debug!("HEAD request for range failed; falling back to full download: {}", e);
            false
        }
    }
}
