//! Filesystem helpers: recursive enumeration, sizing and copying.

pub mod copy;
pub mod walker;

pub use copy::{copy_file, copy_files, copy_tree, CopyOutcome};
pub use walker::{directory_size, list_files_recursive, walk_files, FileEntry};
