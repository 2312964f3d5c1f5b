//! Snapshot manifest, serialized as `manifest.json` in each snapshot directory.
//!
//! The manifest is written once, after every file copy has succeeded, by
//! writing `manifest.json.tmp` and renaming it into place. It is never
//! modified afterwards.

use crate::snapshot::component::Component;
use crate::snapshot::id::MANIFEST_FILE;
use crate::utils::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

const MANIFEST_TMP_FILE: &str = "manifest.json.tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Full,
    Selective,
}

/// A conflict flagged by the caller at capture time. Stored and echoed back
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conflict(pub serde_json::Value);

impl From<serde_json::Value> for Conflict {
    fn from(value: serde_json::Value) -> Self {
        Conflict(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotManifest {
    pub id: String,
    pub kind: SnapshotKind,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub source_path: String,
    #[serde(default)]
    pub detected_components: serde_json::Value,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub files: Vec<String>,
}

impl SnapshotManifest {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Component categories that have at least one captured file.
    pub fn categories(&self) -> Vec<Component> {
        Component::CATEGORIES
            .into_iter()
            .filter(|c| self.files.iter().any(|f| c.matches(f)))
            .collect()
    }
}

/// Read and parse `manifest.json` from a snapshot directory.
pub async fn load(snapshot_dir: &Path) -> Result<SnapshotManifest> {
    let content = fs::read_to_string(snapshot_dir.join(MANIFEST_FILE)).await?;
    let manifest = serde_json::from_str(&content)?;
    Ok(manifest)
}

/// Read a manifest, treating a missing or unparseable file as absent.
pub async fn try_load(snapshot_dir: &Path) -> Option<SnapshotManifest> {
    match load(snapshot_dir).await {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            if !e.is_not_found() {
                tracing::debug!(
                    "Ignoring unreadable manifest in {}: {}",
                    snapshot_dir.display(),
                    e
                );
            }
            None
        }
    }
}

/// Write the manifest pretty-printed under a temporary name, then rename it
/// into place.
pub async fn commit(snapshot_dir: &Path, manifest: &SnapshotManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    let tmp = snapshot_dir.join(MANIFEST_TMP_FILE);
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, snapshot_dir.join(MANIFEST_FILE)).await?;
    Ok(())
}
