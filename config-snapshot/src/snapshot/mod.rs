//! Configuration snapshots: naming, manifests, component filtering and the
//! lifecycle manager.

pub mod component;
pub mod id;
pub mod manager;
pub mod manifest;
pub mod report;

pub use component::Component;
pub use manager::SnapshotManager;
pub use manifest::{Conflict, SnapshotKind, SnapshotManifest};
pub use report::{CleanupReport, CreateReport, PruneReport, RestoreReport, SnapshotStats, VerifyReport};
