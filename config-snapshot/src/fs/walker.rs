//! Directory traversal for snapshot capture and size accounting.
//!
//! Every function here is tolerant of a missing or unreadable root: a tree
//! that isn't there is simply empty.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Information about a regular file discovered during walking
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Full path to the file
    pub path: PathBuf,

    /// Path relative to the walk root, always `/`-separated
    pub relative_path: String,

    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a FileEntry from a DirEntry.
    /// The walk follows symlinks, so metadata describes the link target;
    /// anything that isn't a regular file yields `None`.
    fn from_entry(entry: &DirEntry, root: &Path) -> Option<Self> {
        let path = entry.path().to_path_buf();
        let relative_path = relative_key(&path, root)?;
        let metadata = entry.metadata().ok()?;

        if !metadata.is_file() {
            return None;
        }

        Some(Self {
            path,
            relative_path,
            size: metadata.len(),
        })
    }
}

/// Convert `path` to a `/`-separated key relative to `root`.
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Walk a directory tree and collect every regular file.
///
/// Symlinked files and directories are followed and recorded under the
/// link's own path. Symlink loops, broken links and unreadable entries are
/// skipped. A missing root yields an empty list.
pub fn walk_files(root: &Path) -> Vec<FileEntry> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                warn!("Skipping symlink loop under {}: {}", root.display(), e);
                continue;
            }
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        if let Some(file) = FileEntry::from_entry(&entry, root) {
            files.push(file);
        }
    }

    files
}

/// Relative paths of every regular file under `root`.
pub fn list_files_recursive(root: &Path) -> Vec<String> {
    walk_files(root)
        .into_iter()
        .map(|f| f.relative_path)
        .collect()
}

/// Total size in bytes of all regular files under `root` (0 when missing).
pub fn directory_size(root: &Path) -> u64 {
    walk_files(root).iter().map(|f| f.size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_empty_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(list_files_recursive(temp_dir.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_missing_directory() {
        let files = list_files_recursive(Path::new("/definitely/not/here/.claude"));
        assert!(files.is_empty());
        assert_eq!(directory_size(Path::new("/definitely/not/here/.claude")), 0);
    }

    #[test]
    fn test_walk_with_subdirectories() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;

        fs::create_dir_all(temp_dir.path().join("agents/nested"))?;
        fs::create_dir(temp_dir.path().join("empty"))?;
        fs::write(temp_dir.path().join("settings.json"), b"{}")?;
        fs::write(temp_dir.path().join("agents/nested/tester.md"), b"# tester")?;

        let files = list_files_recursive(temp_dir.path());
        assert_eq!(files, vec!["agents/nested/tester.md", "settings.json"]);

        Ok(())
    }

    #[test]
    fn test_directory_size() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;

        fs::create_dir(temp_dir.path().join("hooks"))?;
        fs::write(temp_dir.path().join("file1.txt"), b"12345")?; // 5 bytes
        fs::write(temp_dir.path().join("hooks/file2.py"), b"1234567")?; // 7 bytes

        assert_eq!(directory_size(temp_dir.path()), 12);

        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinked_files_and_directories_are_followed() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir(root.join("real"))?;
        fs::write(root.join("real/a.txt"), b"abc")?;
        std::os::unix::fs::symlink(root.join("real/a.txt"), root.join("link.txt"))?;
        std::os::unix::fs::symlink(root.join("real"), root.join("dirlink"))?;
        std::os::unix::fs::symlink(root.join("gone"), root.join("broken"))?;

        let files = list_files_recursive(root);
        assert_eq!(files, vec!["dirlink/a.txt", "link.txt", "real/a.txt"]);
        assert_eq!(directory_size(root), 9);

        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinked_skill_directory_outside_root() -> std::io::Result<()> {
        let live = TempDir::new()?;
        let shared = TempDir::new()?;

        fs::create_dir_all(shared.path().join("review"))?;
        fs::write(shared.path().join("review/SKILL.md"), b"# review")?;
        fs::create_dir(live.path().join("skills"))?;
        fs::write(live.path().join("settings.json"), b"{}")?;
        std::os::unix::fs::symlink(shared.path().join("review"), live.path().join("skills/review"))?;

        let files = list_files_recursive(live.path());
        assert_eq!(files, vec!["settings.json", "skills/review/SKILL.md"]);

        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_loop_terminates() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir(root.join("agents"))?;
        fs::write(root.join("agents/tester.md"), b"# tester")?;
        std::os::unix::fs::symlink(root, root.join("agents/back"))?;

        let files = list_files_recursive(root);
        assert_eq!(files, vec!["agents/tester.md"]);

        Ok(())
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("/base");
        let key = relative_key(&Path::new("/base").join("a").join("b.md"), root);
        assert_eq!(key.as_deref(), Some("a/b.md"));
        assert_eq!(relative_key(root, root), None);
    }
}
