//! Snapshot identifiers and on-disk naming.
//!
//! An id is the UTC creation time with path-unsafe characters replaced,
//! followed by a short random suffix, e.g. `2026-10-18T09-41-07-512Z-3f9a0c1e`.
//! Ids sort lexicographically by creation time.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Infix between the config dir name and the id in a snapshot directory name.
pub const SNAPSHOT_INFIX: &str = ".backup-migration-";

/// Manifest file name inside a snapshot directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Subdirectory of a snapshot holding the mirrored tree.
pub const FILES_DIR: &str = "files";

const SUFFIX_LEN: usize = 8;

/// Generate a new snapshot id for the current time.
pub fn generate_id() -> String {
    generate_id_at(Utc::now())
}

/// Generate a snapshot id for a given creation time.
pub fn generate_id_at(at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", stamp, &suffix[..SUFFIX_LEN])
}

/// Reject ids that could escape the snapshot parent directory.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && !id.contains("..")
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains('\0')
}

/// Directory name of the snapshot `id` for a config dir called `config_name`.
pub fn snapshot_dir_name(config_name: &str, id: &str) -> String {
    format!("{}{}{}", config_name, SNAPSHOT_INFIX, id)
}

/// Extract the id from a sibling directory name, if it is a snapshot of
/// `config_name`.
pub fn id_from_dir_name<'a>(config_name: &str, dir_name: &'a str) -> Option<&'a str> {
    let id = dir_name.strip_prefix(config_name)?.strip_prefix(SNAPSHOT_INFIX)?;
    is_valid_id(id).then_some(id)
}

/// Map an id to its snapshot directory, a sibling of `config_dir`. Pure.
pub fn resolve_snapshot_path(config_dir: &Path, id: &str) -> PathBuf {
    let parent = config_dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(snapshot_dir_name(&config_dir_name(config_dir), id))
}

/// File name of the live config dir, e.g. `.claude`.
pub fn config_dir_name(config_dir: &Path) -> String {
    config_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".claude".to_string())
}
