//! `terraform-get` discovery handshake for directory-mode locators.
//!
//! A GET with `terraform-get=1` appended must answer 2xx. The source is taken
//! from the `X-Terraform-Get` header or, failing that, from a
//! `<meta name="terraform-get" content="...">` tag in the document head.

pub mod meta;

use crate::error::{FetchError, Result};
use crate::http::{BufferSink, HttpClient, TERRAFORM_GET_HEADER};
use crate::locator::append_query;
use url::Url;

/// Query parameter marking a discovery request, and the meta tag keyword.
pub const DISCOVERY_PARAM: &str = "terraform-get";

/// Resolves the true source of a directory-mode locator.
///
/// `url` is the caller's working copy; the marker parameter is added to a
/// clone of it. Exactly one GET is issued.
pub fn discover(client: &dyn HttpClient, url: &Url) -> Result<String> {
    let mut request = url.clone();
    append_query(&mut request, DISCOVERY_PARAM, "1");

    let mut sink = BufferSink::default();
    let head = client.get(request.as_str(), &[], &mut sink)?;
    if !head.is_success() {
        return Err(FetchError::BadStatus {
            method: "GET",
            url: request.to_string(),
            code: head.status,
        });
    }

    let source = match head.header(TERRAFORM_GET_HEADER).filter(|v| !v.is_empty()) {
        Some(v) => {
            tracing::debug!("{} named source {} in header", request, v);
            v.to_string()
        }
        None => meta::find_source(&sink.body, DISCOVERY_PARAM)?.unwrap_or_default(),
    };

    if source.is_empty() {
        return Err(FetchError::NoSource {
            url: request.to_string(),
        });
    }
    Ok(source)
}
