//! Generic dispatch: "fetch this source into that directory, whatever it is".
//!
//! The directory path of the getter recurses through a `Dispatcher` rather
//! than calling itself, so a multi-protocol front end can plug in its own.
//! `HttpDispatcher` is the HTTP-only implementation used by the CLI.

use crate::fs::{FsTreeCopier, GlobResolver, SubdirResolver, TreeCopier};
use crate::getter::HttpGetter;
use crate::http::HttpClient;
use crate::locator::{self, filename_for};
use crate::mode::ClientMode;
use crate::netrc::CredentialSource;
use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

pub trait Dispatcher: Send + Sync {
    /// Fetches `source` into the directory `dst`.
    fn dispatch(&self, dst: &Path, source: &str) -> Result<()>;
}

/// Dispatches HTTP(S) sources back into an `HttpGetter`: directory locators
/// through discovery, file locators into `dst/<file name>`.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Arc<dyn HttpClient>,
    credentials: Option<Arc<dyn CredentialSource>>,
    resolver: Arc<dyn SubdirResolver>,
    copier: Arc<dyn TreeCopier>,
}

impl HttpDispatcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            credentials: None,
            resolver: Arc::new(GlobResolver),
            copier: Arc::new(FsTreeCopier),
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Arc<dyn CredentialSource>>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Getter sharing this dispatcher's collaborators and recursing into it.
    pub fn getter(&self) -> HttpGetter {
        HttpGetter::new(Arc::clone(&self.client), Arc::new(self.clone()))
            .with_credentials(self.credentials.clone())
            .with_resolver(Arc::clone(&self.resolver))
            .with_copier(Arc::clone(&self.copier))
    }
}

impl Dispatcher for HttpDispatcher {
    fn dispatch(&self, dst: &Path, source: &str) -> Result<()> {
        let source = strip_forced_getter(source)?;
        let url = locator::parse(source)?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("unsupported protocol {:?} in {}", url.scheme(), source);
        }

        let getter = self.getter();
        match getter.client_mode(&url) {
            ClientMode::Dir => getter.get(dst, &url)?,
            ClientMode::File => {
                let target = dst.join(filename_for(&url));
                let outcome = getter.get_file(&target, &url)?;
                if let Some(w) = outcome.range_warning {
                    tracing::warn!("{}; fetched the entire file", w);
                }
            }
        }
        Ok(())
    }
}

/// Drops an `http::`/`https::` forced-getter prefix; any other forced
/// getter names a protocol this dispatcher cannot fetch.
fn strip_forced_getter(source: &str) -> Result<&str> {
    let scheme_at = source.find("://").unwrap_or(source.len());
    let Some(idx) = source[..scheme_at].find("::") else {
        return Ok(source);
    };
    match &source[..idx] {
        "http" | "https" => Ok(&source[idx + 2..]),
        forced => bail!("unsupported getter {:?} in {}", forced, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_getter_prefix() {
        assert_eq!(
            strip_forced_getter("https::https://example.com/m/").unwrap(),
            "https://example.com/m/"
        );
        assert_eq!(
            strip_forced_getter("https://example.com/a::b").unwrap(),
            "https://example.com/a::b"
        );
        assert!(strip_forced_getter("git::https://example.com/repo.git").is_err());
    }

    #[test]
    fn non_http_scheme_is_refused() {
        let d = HttpDispatcher::new(Arc::new(crate::http::CurlClient::default()));
        let dir = tempfile::tempdir().unwrap();
        let err = d.dispatch(dir.path(), "file:///etc/hosts").unwrap_err();
        assert!(err.to_string().contains("unsupported protocol"));
    }
}
