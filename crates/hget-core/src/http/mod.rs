//! HTTP client abstraction.
//!
//! The getter only talks to `HttpClient`: a metadata-only `head` probe and a
//! streaming `get` that hands the response head to a `ResponseSink` before any
//! body bytes, so the sink can reject a status before touching the disk.
//! `CurlClient` is the libcurl-backed implementation.

mod curl_client;
mod parse;

pub use curl_client::CurlClient;
pub use parse::parse_head;

use crate::error::Result;

/// Header carrying the discovered source on a discovery response.
pub const TERRAFORM_GET_HEADER: &str = "X-Terraform-Get";

/// Status line and headers of the final response (after redirects).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u32,
    /// Header (name, value) pairs in arrival order.
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True if the server sent `Accept-Ranges: bytes`.
    pub fn accepts_byte_ranges(&self) -> bool {
        self.header("accept-ranges")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("bytes"))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Receives a GET response. `head` is called exactly once, before any call to `body`.
pub trait ResponseSink {
    /// Inspect the final response head. An error aborts the transfer and is
    /// returned from `HttpClient::get`.
    fn head(&mut self, head: &ResponseHead) -> Result<()>;

    /// Consume the next body chunk. An error aborts the transfer.
    fn body(&mut self, chunk: &[u8]) -> Result<()>;
}

/// Collects the whole body in memory (discovery documents).
#[derive(Debug, Default)]
pub struct BufferSink {
    pub head: ResponseHead,
    pub body: Vec<u8>,
}

impl ResponseSink for BufferSink {
    fn head(&mut self, head: &ResponseHead) -> Result<()> {
        self.head = head.clone();
        Ok(())
    }

    fn body(&mut self, chunk: &[u8]) -> Result<()> {
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}

/// HTTP transport used by the getter. Implementations must be safe to share
/// across concurrent calls.
pub trait HttpClient: Send + Sync {
    /// Metadata-only request. Non-2xx statuses are returned, not errors.
    fn head(&self, url: &str, headers: &[(String, String)]) -> Result<ResponseHead>;

    /// GET `url`, streaming the response into `sink`. Non-2xx statuses are
    /// handed to the sink like any other; transport failures and sink errors
    /// are returned.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
        sink: &mut dyn ResponseSink,
    ) -> Result<ResponseHead>;
}
