//! Snapshot lifecycle: create, list, restore, verify, measure and prune
//! backups of a live configuration directory.
//!
//! Snapshots are sibling directories of the live tree:
//! ```text
//! parent/
//!   .claude/                                   # live tree
//!   .claude.backup-migration-<id>/
//!     manifest.json
//!     files/<relative_path>
//! ```
//!
//! Operations run one file at a time and never return `Err`. Per-file
//! failures are collected into the returned report. There is no locking:
//! callers serialize operations on the same live tree.

use crate::fs::copy::{copy_files, copy_tree, CopyOutcome};
use crate::fs::walker::{directory_size, list_files_recursive};
use crate::setup::{DirectoryDetector, SetupDetector};
use crate::snapshot::component::{filter_paths, selects_all, Component};
use crate::snapshot::id::{
    config_dir_name, generate_id_at, id_from_dir_name, is_valid_id, resolve_snapshot_path,
    FILES_DIR,
};
use crate::snapshot::manifest::{self, Conflict, SnapshotKind, SnapshotManifest};
use crate::snapshot::report::{
    CleanupReport, CreateReport, PruneReport, RestoreReport, SnapshotStats, VerifyReport,
};
use chrono::Utc;
use std::io;
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

pub struct SnapshotManager {
    config_dir: PathBuf,
    detector: Arc<dyn SetupDetector>,
}

impl SnapshotManager {
    /// Manager for the live tree at `config_dir`, describing installed
    /// components with [`DirectoryDetector`].
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self::with_detector(config_dir, DirectoryDetector)
    }

    pub fn with_detector(config_dir: impl Into<PathBuf>, detector: impl SetupDetector + 'static) -> Self {
        Self {
            config_dir: absolutize(config_dir.into()),
            detector: Arc::new(detector),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory a snapshot with this id lives in. No I/O.
    pub fn snapshot_path(&self, id: &str) -> PathBuf {
        resolve_snapshot_path(&self.config_dir, id)
    }

    fn parent_dir(&self) -> PathBuf {
        self.config_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Capture the whole live tree.
    pub async fn create_full(&self, reason: &str, conflicts: Vec<Conflict>) -> CreateReport {
        self.capture(reason, SnapshotKind::Full, None, conflicts).await
    }

    /// Capture only the files belonging to `components`. Naming `all` (or
    /// nothing) captures every file but still records a selective snapshot.
    pub async fn create_selective(&self, reason: &str, components: &[Component]) -> CreateReport {
        self.capture(
            reason,
            SnapshotKind::Selective,
            Some(components.to_vec()),
            Vec::new(),
        )
        .await
    }

    async fn capture(
        &self,
        reason: &str,
        kind: SnapshotKind,
        components: Option<Vec<Component>>,
        conflicts: Vec<Conflict>,
    ) -> CreateReport {
        let timestamp = Utc::now();
        let id = generate_id_at(timestamp);
        let path = self.snapshot_path(&id);
        let files_dir = path.join(FILES_DIR);

        let mut report = CreateReport {
            success: false,
            id: id.clone(),
            path: path.clone(),
            manifest: None,
            errors: Vec::new(),
        };

        if !self.config_dir.exists() {
            warn!(
                snapshot_id = %id,
                "Live directory {} does not exist, snapshot will be empty",
                self.config_dir.display()
            );
        }

        let detected_components = self.detect_setup().await;

        let outcome = match &components {
            None => copy_tree(&self.config_dir, &files_dir).await,
            Some(selected) => match fs::create_dir_all(&files_dir).await {
                Ok(()) => {
                    let all = enumerate(self.config_dir.clone()).await;
                    let wanted = filter_paths(&all, selected);
                    Ok(copy_files(&self.config_dir, &files_dir, &wanted).await)
                }
                Err(e) => Err(e),
            },
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(snapshot_id = %id, "Failed to prepare snapshot directory: {}", e);
                report
                    .errors
                    .push(format!("Failed to create {}: {}", files_dir.display(), e));
                return report;
            }
        };

        let CopyOutcome {
            copied,
            skipped,
            failed,
            bytes,
        } = outcome;

        if !skipped.is_empty() {
            debug!(snapshot_id = %id, "{} files vanished before they could be copied", skipped.len());
        }

        if !failed.is_empty() {
            report.errors = failed
                .into_iter()
                .map(|(rel, e)| format!("{}: {}", rel, e))
                .collect();
            warn!(
                snapshot_id = %id,
                "Snapshot left uncommitted after {} copy failures",
                report.errors.len()
            );
            return report;
        }

        let manifest = SnapshotManifest {
            id: id.clone(),
            kind,
            reason: reason.to_string(),
            timestamp,
            source_path: self.config_dir.display().to_string(),
            detected_components,
            conflicts,
            files: copied,
        };

        if let Err(e) = manifest::commit(&path, &manifest).await {
            warn!(snapshot_id = %id, "Failed to write manifest: {}", e);
            report.errors.push(format!("Failed to write manifest: {}", e));
            return report;
        }

        info!(
            snapshot_id = %id,
            kind = ?kind,
            files = manifest.files.len(),
            bytes,
            "Created snapshot"
        );

        report.success = true;
        report.manifest = Some(manifest);
        report
    }

    /// Run the setup detector on the blocking pool.
    async fn detect_setup(&self) -> serde_json::Value {
        let detector = Arc::clone(&self.detector);
        let config_dir = self.config_dir.clone();
        match tokio::task::spawn_blocking(move || detector.detect(&config_dir)).await {
            Ok(detected) => detected,
            Err(e) => {
                warn!("Setup detection failed: {}", e);
                serde_json::Value::Null
            }
        }
    }

    /// All committed snapshots, newest first.
    pub async fn list(&self) -> Vec<SnapshotManifest> {
        let mut manifests = Vec::new();

        for (id, dir) in self.snapshot_dirs().await {
            match manifest::try_load(&dir).await {
                Some(m) if m.id == id => manifests.push(m),
                Some(m) => debug!("Skipping {}: manifest id {} does not match", dir.display(), m.id),
                None => debug!("Skipping {}: no readable manifest", dir.display()),
            }
        }

        manifests.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        manifests
    }

    /// The most recent committed snapshot.
    pub async fn latest(&self) -> Option<SnapshotManifest> {
        self.list().await.into_iter().next()
    }

    /// Manifest of snapshot `id`, or `None` if it is missing or unreadable.
    pub async fn get(&self, id: &str) -> Option<SnapshotManifest> {
        if !is_valid_id(id) {
            return None;
        }
        manifest::try_load(&self.snapshot_path(id))
            .await
            .filter(|m| m.id == id)
    }

    /// Copy the stored files of snapshot `id` back into the live tree,
    /// overwriting what is there. Each file is attempted independently.
    pub async fn restore(&self, id: &str, components: &[Component]) -> RestoreReport {
        let Some(manifest) = self.get(id).await else {
            warn!(snapshot_id = %id, "Restore requested for unknown snapshot");
            return RestoreReport::failed(format!("Snapshot not found: {}", id));
        };

        let mut report = RestoreReport::default();

        let mut selected = Vec::new();
        for rel in filter_paths(&manifest.files, components) {
            if is_safe_relative(&rel) {
                selected.push(rel);
            } else {
                report.errors.push(format!("{}: refusing path outside the live directory", rel));
            }
        }

        let files_dir = self.snapshot_path(id).join(FILES_DIR);
        let outcome = copy_files(&files_dir, &self.config_dir, &selected).await;

        report.restored_files = outcome.copied;
        report.errors.extend(
            outcome
                .skipped
                .into_iter()
                .map(|rel| format!("{}: missing from snapshot", rel)),
        );
        report.errors.extend(
            outcome
                .failed
                .into_iter()
                .map(|(rel, e)| format!("{}: {}", rel, e)),
        );
        report.success = report.errors.is_empty();

        let scope = if selects_all(components) {
            "all".to_string()
        } else {
            components
                .iter()
                .map(Component::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };

        if report.success {
            info!(snapshot_id = %id, scope = %scope, files = report.restored_files.len(), "Restored snapshot");
        } else {
            warn!(
                snapshot_id = %id,
                scope = %scope,
                restored = report.restored_files.len(),
                failed = report.errors.len(),
                "Restore finished with errors"
            );
        }

        report
    }

    /// Check that every file in the manifest still has a stored copy, and
    /// that the copy is a regular file.
    pub async fn verify(&self, id: &str) -> VerifyReport {
        let Some(manifest) = self.get(id).await else {
            return VerifyReport {
                valid: false,
                missing_files: Vec::new(),
                errors: vec![format!("Snapshot not found: {}", id)],
            };
        };

        let files_dir = self.snapshot_path(id).join(FILES_DIR);
        let mut report = VerifyReport::default();

        for rel in &manifest.files {
            match fs::metadata(files_dir.join(rel)).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => report.missing_files.push(rel.clone()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => report.missing_files.push(rel.clone()),
                Err(e) => report.errors.push(format!("{}: {}", rel, e)),
            }
        }

        report.valid = report.missing_files.is_empty() && report.errors.is_empty();
        if !report.valid {
            warn!(snapshot_id = %id, missing = report.missing_files.len(), "Snapshot failed verification");
        }
        report
    }

    /// Manifest summary plus the snapshot directory's size measured now.
    pub async fn stats(&self, id: &str) -> Option<SnapshotStats> {
        let manifest = self.get(id).await?;
        let mut stats = SnapshotStats::from(&manifest);

        let dir = self.snapshot_path(id);
        stats.size_bytes = tokio::task::spawn_blocking(move || directory_size(&dir))
            .await
            .unwrap_or(0);

        Some(stats)
    }

    /// Remove snapshot `id`. An already absent snapshot counts as deleted.
    pub async fn delete(&self, id: &str) -> bool {
        if !is_valid_id(id) {
            return false;
        }

        match self.remove_snapshot_dir(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(snapshot_id = %id, "Failed to delete snapshot: {}", e);
                false
            }
        }
    }

    /// Keep the `keep_count` newest snapshots and delete the rest.
    pub async fn cleanup(&self, keep_count: usize) -> CleanupReport {
        let mut report = CleanupReport::default();

        for manifest in self.list().await.into_iter().skip(keep_count) {
            match self.remove_snapshot_dir(&manifest.id).await {
                Ok(()) => report.deleted.push(manifest.id),
                Err(e) => {
                    warn!(snapshot_id = %manifest.id, "Failed to delete snapshot: {}", e);
                    report.errors.push(format!("{}: {}", manifest.id, e));
                }
            }
        }

        info!(
            kept = keep_count,
            deleted = report.deleted.len(),
            failed = report.errors.len(),
            "Snapshot cleanup finished"
        );
        report
    }

    /// Ids of snapshot directories without a readable manifest, e.g. left by
    /// an interrupted or failed create.
    pub async fn list_incomplete(&self) -> Vec<String> {
        let mut incomplete = Vec::new();
        for (id, dir) in self.snapshot_dirs().await {
            if manifest::try_load(&dir).await.is_none() {
                incomplete.push(id);
            }
        }
        incomplete.sort();
        incomplete
    }

    /// Remove every incomplete snapshot directory. Must not run while another
    /// process is creating a snapshot of the same tree.
    pub async fn prune_incomplete(&self) -> PruneReport {
        let mut report = PruneReport::default();

        for id in self.list_incomplete().await {
            match self.remove_snapshot_dir(&id).await {
                Ok(()) => report.removed.push(id),
                Err(e) => report.errors.push(format!("{}: {}", id, e)),
            }
        }

        if !report.removed.is_empty() {
            info!(removed = report.removed.len(), "Pruned incomplete snapshots");
        }
        report
    }

    async fn remove_snapshot_dir(&self, id: &str) -> io::Result<()> {
        match fs::remove_dir_all(self.snapshot_path(id)).await {
            Ok(()) => {
                debug!(snapshot_id = %id, "Removed snapshot directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `(id, path)` of every sibling directory named like a snapshot of the
    /// live tree.
    async fn snapshot_dirs(&self) -> Vec<(String, PathBuf)> {
        let parent = self.parent_dir();
        let config_name = config_dir_name(&self.config_dir);
        let mut dirs = Vec::new();

        let mut entries = match fs::read_dir(&parent).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read {}: {}", parent.display(), e);
                return dirs;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Stopped scanning {}: {}", parent.display(), e);
                    break;
                }
            };

            let name = entry.file_name();
            let Some(id) = id_from_dir_name(&config_name, &name.to_string_lossy()).map(str::to_string)
            else {
                continue;
            };

            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                dirs.push((id, entry.path()));
            }
        }

        dirs
    }
}

/// Relative file paths under `root`, walked on the blocking pool.
async fn enumerate(root: PathBuf) -> Vec<String> {
    tokio::task::spawn_blocking(move || list_files_recursive(&root))
        .await
        .unwrap_or_default()
}

/// A manifest path must stay inside the tree it is joined onto.
fn is_safe_relative(rel: &str) -> bool {
    !rel.is_empty()
        && Path::new(rel)
            .components()
            .all(|c| matches!(c, PathComponent::Normal(_)))
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
