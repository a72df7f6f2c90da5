//! HTTP getter.
//!
//! Files are fetched directly, honouring an optional `ranged_request_bytes`
//! directive. Directories go through the `terraform-get` discovery handshake:
//!
//! 1. GET the locator with `terraform-get=1` appended; the response must be 2xx.
//! 2. The source is the `X-Terraform-Get` header, or else the content of
//!    `<meta name="terraform-get">` in the document head.
//! 3. A source without a `//subdir` is handed to the dispatcher as is. With a
//!    subdir, the whole source is fetched into a staging directory and only
//!    the subdir is copied to the destination.
//!
//! The source must be a fully formed URL; shorthands and relative paths are
//! not resolved.

mod file;
mod subdir;


pub use file::FileOutcome;
pub use subdir::STAGING_DATA_DIR;

use crate::discovery;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::fs::{FsTreeCopier, GlobResolver, SubdirResolver, TreeCopier};
use crate::http::HttpClient;
use crate::locator::{remove_query, split_subdir};
use crate::mode::{self, ClientMode};
use crate::netrc::CredentialSource;
use crate::range::{range_from_url, RANGE_DIRECTIVE_PARAM};
use std::path::Path;
use std::sync::Arc;
use subdir::SubdirExtractor;
use url::Url;

pub struct HttpGetter {
    client: Arc<dyn HttpClient>,
    dispatcher: Arc<dyn Dispatcher>,
    credentials: Option<Arc<dyn CredentialSource>>,
    resolver: Arc<dyn SubdirResolver>,
    copier: Arc<dyn TreeCopier>,
}

impl HttpGetter {
    /// Getter with the glob subdir resolver, the filesystem tree copier and
    /// no credential source.
    pub fn new(client: Arc<dyn HttpClient>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            client,
            dispatcher,
            credentials: None,
            resolver: Arc::new(GlobResolver),
            copier: Arc::new(FsTreeCopier),
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Arc<dyn CredentialSource>>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SubdirResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_copier(mut self, copier: Arc<dyn TreeCopier>) -> Self {
        self.copier = copier;
        self
    }

    pub fn client_mode(&self, url: &Url) -> ClientMode {
        mode::classify(url)
    }

    /// Fetches the directory tree behind `url` into `dst`.
    pub fn get(&self, dst: &Path, url: &Url) -> Result<()> {
        let working = self.working_copy(url)?;
        let source = discovery::discover(self.client.as_ref(), &working)?;
        tracing::debug!("{} resolved to {}", url, source);

        let (base, subdir) = split_subdir(&source);
        if subdir.is_empty() {
            self.dispatcher.dispatch(dst, &base)?;
            return Ok(());
        }

        SubdirExtractor {
            dispatcher: self.dispatcher.as_ref(),
            resolver: self.resolver.as_ref(),
            copier: self.copier.as_ref(),
        }
        .extract(dst, &source, &base, &subdir)
    }

    /// Fetches the single file behind `url` into `dst`.
    ///
    /// An invalid range directive does not fail the call: the whole file is
    /// fetched and the problem is reported in `FileOutcome::range_warning`.
    pub fn get_file(&self, dst: &Path, url: &Url) -> Result<FileOutcome> {
        let mut working = self.working_copy(url)?;
        let range = range_from_url(&working);
        remove_query(&mut working, RANGE_DIRECTIVE_PARAM);
        file::fetch_file(self.client.as_ref(), dst, working.as_str(), range)
    }

    /// Clone of `url` with credentials added; the caller's URL is never touched.
    fn working_copy(&self, url: &Url) -> Result<Url> {
        let mut working = url.clone();
        if let Some(credentials) = &self.credentials {
            credentials.augment(&mut working)?;
        }
        Ok(working)
    }
}
