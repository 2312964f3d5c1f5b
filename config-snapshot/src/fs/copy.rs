//! Byte-for-byte file and tree copies.
//!
//! Copies are sequential and not atomic: a failure partway through leaves a
//! partial destination tree. Each file is attempted independently and the
//! outcome records what was copied, skipped, or failed.

use crate::fs::walker::walk_files;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Result of copying a set of relative paths from one root to another
#[derive(Debug, Default)]
pub struct CopyOutcome {
    /// Relative paths copied successfully, in the order attempted
    pub copied: Vec<String>,

    /// Relative paths whose source no longer exists
    pub skipped: Vec<String>,

    /// Relative paths that failed, with the error
    pub failed: Vec<(String, io::Error)>,

    /// Bytes written across all copied files
    pub bytes: u64,
}

impl CopyOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copy a single file, creating the destination's parent directories first.
/// Overwrites an existing destination file.
pub async fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(src, dest).await
}

/// Copy each relative path from `src_root` into the same place under
/// `dest_root`.
pub async fn copy_files(src_root: &Path, dest_root: &Path, relative_paths: &[String]) -> CopyOutcome {
    let mut outcome = CopyOutcome::default();

    for rel in relative_paths {
        let src = src_root.join(rel);
        let dest = dest_root.join(rel);

        match copy_file(&src, &dest).await {
            Ok(bytes) => {
                debug!("Copied {}", rel);
                outcome.bytes += bytes;
                outcome.copied.push(rel.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !src.exists() => {
                debug!("Source vanished, skipping {}", rel);
                outcome.skipped.push(rel.clone());
            }
            Err(e) => {
                warn!("Failed to copy {}: {}", rel, e);
                outcome.failed.push((rel.clone(), e));
            }
        }
    }

    outcome
}

/// Mirror every regular file under `src` into `dest`.
///
/// A missing `src` copies nothing. The destination root is created even when
/// there is nothing to copy.
pub async fn copy_tree(src: &Path, dest: &Path) -> io::Result<CopyOutcome> {
    fs::create_dir_all(dest).await?;

    let src_owned = src.to_path_buf();
    let files = tokio::task::spawn_blocking(move || walk_files(&src_owned))
        .await
        .map_err(io::Error::other)?;

    let relative: Vec<String> = files.into_iter().map(|f| f.relative_path).collect();
    Ok(copy_files(src, dest, &relative).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_tree_mirrors_nested_files() -> io::Result<()> {
        let src = TempDir::new()?;
        let dest = TempDir::new()?;

        stdfs::create_dir_all(src.path().join("skills/review"))?;
        stdfs::write(src.path().join("skills/review/SKILL.md"), b"# review")?;
        stdfs::write(src.path().join("settings.json"), b"{\"a\":1}")?;

        let outcome = copy_tree(src.path(), &dest.path().join("files")).await?;

        assert!(outcome.is_complete());
        assert_eq!(outcome.copied, vec!["settings.json", "skills/review/SKILL.md"]);
        assert_eq!(outcome.bytes, 15);
        assert_eq!(
            stdfs::read(dest.path().join("files/skills/review/SKILL.md"))?,
            b"# review"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_tree_missing_source_is_empty() -> io::Result<()> {
        let dest = TempDir::new()?;
        let outcome = copy_tree(&dest.path().join("nope"), &dest.path().join("out")).await?;

        assert!(outcome.copied.is_empty());
        assert!(dest.path().join("out").is_dir());

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_files_skips_vanished_and_isolates_failures() -> io::Result<()> {
        let src = TempDir::new()?;
        let dest = TempDir::new()?;

        stdfs::write(src.path().join("a.txt"), b"a")?;
        stdfs::write(src.path().join("b.txt"), b"b")?;
        // A directory where the file should land makes that one copy fail.
        stdfs::create_dir_all(dest.path().join("b.txt/occupied"))?;

        let wanted = vec!["a.txt".to_string(), "gone.txt".to_string(), "b.txt".to_string()];
        let outcome = copy_files(src.path(), dest.path(), &wanted).await;

        assert_eq!(outcome.copied, vec!["a.txt"]);
        assert_eq!(outcome.skipped, vec!["gone.txt"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "b.txt");
        assert!(!outcome.is_complete());

        Ok(())
    }
}
