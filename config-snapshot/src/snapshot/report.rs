//! Structured results returned by snapshot operations.
//!
//! Lifecycle operations never return `Err`; failures land in these reports
//! and callers inspect `success` / `valid`.

use crate::snapshot::manifest::{SnapshotKind, SnapshotManifest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of creating a snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReport {
    pub success: bool,
    pub id: String,
    pub path: PathBuf,
    /// Present only when the manifest was committed
    pub manifest: Option<SnapshotManifest>,
    pub errors: Vec<String>,
}

/// Outcome of restoring a snapshot into the live tree
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub success: bool,
    pub restored_files: Vec<String>,
    pub errors: Vec<String>,
}

impl RestoreReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            restored_files: Vec::new(),
            errors: vec![error.into()],
        }
    }
}

/// Outcome of checking a snapshot's stored copies against its manifest
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub valid: bool,
    pub missing_files: Vec<String>,
    pub errors: Vec<String>,
}

/// Summary of a snapshot with its measured on-disk size
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub id: String,
    pub kind: SnapshotKind,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub file_count: usize,
    pub size_bytes: u64,
}

/// Outcome of a retention pass
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub errors: Vec<String>,
}

/// Outcome of removing snapshot directories that never got a manifest
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneReport {
    pub removed: Vec<String>,
    pub errors: Vec<String>,
}

impl From<&SnapshotManifest> for SnapshotStats {
    fn from(manifest: &SnapshotManifest) -> Self {
        Self {
            id: manifest.id.clone(),
            kind: manifest.kind,
            timestamp: manifest.timestamp,
            reason: manifest.reason.clone(),
            file_count: manifest.file_count(),
            size_bytes: 0,
        }
    }
}
