/// Cleasy Core: scanning, aggregation and selection over filesystem trees.
///
/// This crate holds all of the logic with no UI dependencies. A front end
/// starts a scan, watches its progress, and drives a [`view::TreeView`] over
/// the finished [`model::Tree`] to let the user pick entries to delete.
///
/// # Modules
///
/// - [`model`]: arena-allocated entry tree and the aggregation pass.
/// - [`scanner`]: concurrent, bounded directory walk with progress reporting.
/// - [`analysis`]: post-scan tree operations (small-directory pruning).
/// - [`view`]: expandable row list with per-entry selection.
/// - [`cleanup`]: deleting the selected entries from disk.
/// - [`error`]: error types crossing the library boundary.
pub mod analysis;
pub mod cleanup;
pub mod error;
pub mod model;
pub mod scanner;
pub mod view;
