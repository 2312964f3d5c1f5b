//! Config Snapshot Library
//!
//! Point-in-time backups of a local agent configuration directory, with
//! full or per-component restore, verification and retention.

pub mod config;
pub mod fs;
pub mod setup;
pub mod snapshot;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use snapshot::{Component, Conflict, SnapshotKind, SnapshotManager, SnapshotManifest};
pub use utils::errors::SnapshotError;
pub type Result<T> = std::result::Result<T, SnapshotError>;
