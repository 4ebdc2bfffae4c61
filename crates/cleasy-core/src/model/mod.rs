/// Data model for the scan tree.
///
/// Re-exports the arena-allocated tree and its entry type.
pub mod entry;
pub mod size;
pub mod tree;

pub use entry::{Entry, NodeIndex};
pub use tree::{NodeRef, Tree, TreeId, ROOT_LEVEL};
