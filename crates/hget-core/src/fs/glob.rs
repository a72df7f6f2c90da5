//! Wildcard subdirectory resolution (`*/modules/vpc`).

use super::SubdirResolver;
use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobResolver;

impl SubdirResolver for GlobResolver {
    fn resolve(&self, root: &Path, pattern: &str) -> Result<PathBuf> {
        resolve_subdir(root, pattern)
    }
}

/// Resolves `pattern` below `root`.
///
/// The pattern must match at most one path. With no match the literal
/// joined path is returned, so the caller's existence check reports it.
/// Patterns escaping `root` (`..`) are refused.
pub fn resolve_subdir(root: &Path, pattern: &str) -> Result<PathBuf> {
    let pattern = pattern.trim_matches('/');
    if pattern.is_empty() {
        return Ok(root.to_path_buf());
    }
    if Path::new(pattern)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        bail!("subdir {:?} escapes the fetched tree", pattern);
    }

    let literal = root.join(pattern);
    let root_str = root
        .to_str()
        .with_context(|| format!("non-UTF-8 staging path {}", root.display()))?;
    let full = format!("{}/{}", ::glob::Pattern::escape(root_str), pattern);

    let mut matches = Vec::new();
    for entry in ::glob::glob(&full).with_context(|| format!("bad subdir pattern {:?}", pattern))? {
        matches.push(entry.with_context(|| format!("resolving subdir {:?}", pattern))?);
    }

    match matches.len() {
        0 => Ok(literal),
        1 => Ok(matches.remove(0)),
        n => bail!("subdir {:?} matches {} paths", pattern, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repo-1a2b/modules/vpc")).unwrap();
        fs::create_dir_all(dir.path().join("repo-1a2b/modules/dns")).unwrap();
        fs::write(dir.path().join("repo-1a2b/modules/vpc/main.tf"), "x").unwrap();
        dir
    }

    #[test]
    fn literal_subdir() {
        let dir = tree();
        let p = resolve_subdir(dir.path(), "repo-1a2b/modules/vpc").unwrap();
        assert_eq!(p, dir.path().join("repo-1a2b/modules/vpc"));
    }

    #[test]
    fn wildcard_single_match() {
        let dir = tree();
        let p = resolve_subdir(dir.path(), "*/modules/vpc/").unwrap();
        assert_eq!(p, dir.path().join("repo-1a2b/modules/vpc"));
    }

    #[test]
    fn wildcard_multiple_matches_is_an_error() {
        let dir = tree();
        let err = resolve_subdir(dir.path(), "*/modules/*").unwrap_err();
        assert!(err.to_string().contains("matches 2 paths"));
    }

    #[test]
    fn no_match_returns_literal_path() {
        let dir = tree();
        let p = resolve_subdir(dir.path(), "missing/dir").unwrap();
        assert_eq!(p, dir.path().join("missing/dir"));
        assert!(!p.exists());
    }

    #[test]
    fn empty_pattern_is_root() {
        let dir = tree();
        assert_eq!(resolve_subdir(dir.path(), "").unwrap(), dir.path());
    }

    #[test]
    fn parent_components_are_refused() {
        let dir = tree();
        assert!(resolve_subdir(dir.path(), "../etc").is_err());
        assert!(resolve_subdir(dir.path(), "a/../../b").is_err());
    }
}
