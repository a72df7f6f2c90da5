//! Recursive tree copy.

use super::TreeCopier;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct FsTreeCopier;

impl TreeCopier for FsTreeCopier {
    fn copy_tree(&self, dst: &Path, src: &Path, follow_symlinks: bool) -> Result<()> {
        copy_tree(dst, src, follow_symlinks)
    }
}

/// Copies the contents of `src` into `dst` (created if missing).
///
/// With `follow_symlinks == false` links are recreated as links pointing at
/// the same target; otherwise the linked file or directory is copied. A file
/// `src` is copied into `dst` under its own name. Directory permissions are
/// carried over.
pub fn copy_tree(dst: &Path, src: &Path, follow_symlinks: bool) -> Result<()> {
    let meta = fs::metadata(src).with_context(|| format!("stat {}", src.display()))?;
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;

    if !meta.is_dir() {
        let name = src
            .file_name()
            .with_context(|| format!("no file name in {}", src.display()))?;
        fs::copy(src, dst.join(name)).with_context(|| format!("copy {}", src.display()))?;
        return Ok(());
    }

    copy_dir_contents(dst, src, follow_symlinks)?;
    fs::set_permissions(dst, meta.permissions())
        .with_context(|| format!("set permissions on {}", dst.display()))?;
    Ok(())
}

fn copy_dir_contents(dst: &Path, src: &Path, follow_symlinks: bool) -> Result<()> {
    for entry in fs::read_dir(src).with_context(|| format!("read dir {}", src.display()))? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        let mut file_type = entry.file_type()?;
        if file_type.is_symlink() {
            if !follow_symlinks {
                copy_link(&from, &to)?;
                continue;
            }
            file_type = fs::metadata(&from)
                .with_context(|| format!("follow link {}", from.display()))?
                .file_type();
        }

        if file_type.is_dir() {
            fs::create_dir_all(&to).with_context(|| format!("create {}", to.display()))?;
            copy_dir_contents(&to, &from, follow_symlinks)?;
            let perms = fs::metadata(&from)?.permissions();
            fs::set_permissions(&to, perms)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).with_context(|| format!("read link {}", from.display()))?;
    std::os::unix::fs::symlink(&target, to)
        .with_context(|| format!("create link {}", to.display()))?;
    Ok(())
}

/// Without unix symlinks the link's target is copied instead.
#[cfg(not(unix))]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    if fs::metadata(from)?.is_dir() {
        fs::create_dir_all(to)?;
        copy_dir_contents(to, from, true)
    } else {
        fs::copy(from, to)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::write(src.path().join("top.tf"), "top").unwrap();
        fs::write(src.path().join("a/b/deep.tf"), "deep").unwrap();
        fs::write(src.path().join(".hidden"), "dot").unwrap();

        let dst = tempfile::tempdir().unwrap();
        let out = dst.path().join("out");
        copy_tree(&out, src.path(), false).unwrap();

        assert_eq!(fs::read_to_string(out.join("top.tf")).unwrap(), "top");
        assert_eq!(fs::read_to_string(out.join("a/b/deep.tf")).unwrap(), "deep");
        assert_eq!(fs::read_to_string(out.join(".hidden")).unwrap(), "dot");
    }

    #[test]
    fn file_source_lands_inside_dst() {
        let src = tempfile::tempdir().unwrap();
        let file = src.path().join("main.tf");
        fs::write(&file, "x").unwrap();
        let dst = tempfile::tempdir().unwrap();
        copy_tree(dst.path(), &file, false).unwrap();
        assert_eq!(fs::read_to_string(dst.path().join("main.tf")).unwrap(), "x");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dst = tempfile::tempdir().unwrap();
        assert!(copy_tree(dst.path(), &dst.path().join("nope"), false).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_kept_as_links_unless_followed() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("real.tf"), "real").unwrap();
        std::os::unix::fs::symlink("real.tf", src.path().join("link.tf")).unwrap();

        let kept = tempfile::tempdir().unwrap();
        copy_tree(kept.path(), src.path(), false).unwrap();
        let link = kept.path().join("link.tf");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("real.tf"));

        let followed = tempfile::tempdir().unwrap();
        copy_tree(followed.path(), src.path(), true).unwrap();
        let copied = followed.path().join("link.tf");
        assert!(fs::symlink_metadata(&copied).unwrap().file_type().is_file());
        assert_eq!(fs::read_to_string(&copied).unwrap(), "real");
    }
}
