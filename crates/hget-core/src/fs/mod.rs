//! Filesystem collaborators of the subdirectory extractor: resolving a
//! (possibly wildcarded) subdirectory inside a staged tree, and copying a
//! tree into the destination.

mod copy;
mod glob;

pub use self::copy::{copy_tree, FsTreeCopier};
pub use self::glob::{resolve_subdir, GlobResolver};

use std::path::{Path, PathBuf};

/// Resolves a subdirectory pattern against a fetched tree.
pub trait SubdirResolver: Send + Sync {
    fn resolve(&self, root: &Path, pattern: &str) -> anyhow::Result<PathBuf>;
}

/// Copies the contents of `src` into the existing directory `dst`.
pub trait TreeCopier: Send + Sync {
    fn copy_tree(&self, dst: &Path, src: &Path, follow_symlinks: bool) -> anyhow::Result<()>;
}
