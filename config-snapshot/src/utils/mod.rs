//! Utility modules for the snapshot manager.

pub mod errors;
pub mod logger;

pub use errors::{Result, SnapshotError};
