//! Fetch a whole source into a staging directory, then promote only the
//! requested subtree to the destination.

use crate::dispatch::Dispatcher;
use crate::error::{FetchError, Result};
use crate::fs::{SubdirResolver, TreeCopier};
use std::fs;
use std::io;
use std::path::Path;

/// Name of the directory inside the staging area that receives the full
/// fetch. Some fetchers refuse to write into an existing empty directory.
pub const STAGING_DATA_DIR: &str = "data";

pub(crate) struct SubdirExtractor<'a> {
    pub dispatcher: &'a dyn Dispatcher,
    pub resolver: &'a dyn SubdirResolver,
    pub copier: &'a dyn TreeCopier,
}

impl SubdirExtractor<'_> {
    /// Fetches `base` into staging and replaces `dst` with its `subdir`.
    /// `source` is the undivided discovered source, used in error messages.
    /// The staging directory is removed on every exit path, panics included.
    pub fn extract(&self, dst: &Path, source: &str, base: &str, subdir: &str) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix("hget")
            .tempdir()
            .map_err(|e| FetchError::io("create staging dir in", std::env::temp_dir(), e))?;
        let data = staging.path().join(STAGING_DATA_DIR);
        tracing::debug!("staging {} in {}", base, data.display());

        self.dispatcher.dispatch(&data, base)?;

        let resolved = self.resolver.resolve(&data, subdir)?;
        if let Err(err) = fs::metadata(&resolved) {
            return Err(FetchError::SubdirMissing {
                source_url: source.to_string(),
                err,
            });
        }

        replace_dir(dst)?;
        self.copier.copy_tree(dst, &resolved, false)?;
        tracing::info!("extracted {} from {} into {}", subdir, base, dst.display());
        Ok(())
    }
}

/// Removes whatever is at `dst` and recreates it as an empty directory.
fn replace_dir(dst: &Path) -> Result<()> {
    let removed = match fs::symlink_metadata(dst) {
        Ok(m) if m.is_dir() => fs::remove_dir_all(dst),
        Ok(_) => fs::remove_file(dst),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };
    removed.map_err(|e| FetchError::io("remove", dst, e))?;
    fs::create_dir_all(dst).map_err(|e| FetchError::io("create", dst, e))?;
    Ok(())
}
