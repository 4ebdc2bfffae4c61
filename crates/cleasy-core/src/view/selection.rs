/// Selection collection and summaries.
///
/// A selected directory stands for its whole subtree, so collection stops
/// descending at the first selected entry on every branch. The result never
/// holds both a directory and something inside it, which is what a bulk
/// delete needs.
use crate::model::{NodeIndex, Tree};
use std::collections::HashSet;

/// Topmost selected entries under `forest`, depth-first in child order.
///
/// Entries in `forest` are visited in the order given; unselected
/// directories are searched, unselected files are skipped.
pub fn collect_selected(
    tree: &Tree,
    forest: &[NodeIndex],
    selected: &HashSet<NodeIndex>,
) -> Vec<NodeIndex> {
    let mut out = Vec::new();
    if selected.is_empty() {
        return out;
    }
    let mut stack: Vec<NodeIndex> = forest.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        if selected.contains(&idx) {
            out.push(idx);
            continue;
        }
        let node = tree.node(idx);
        if node.is_dir {
            stack.extend(node.children.iter().rev().copied());
        }
    }
    out
}

/// What a set of entries adds up to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Entries in the set itself.
    pub entries: usize,
    /// Files covered, counting every file inside selected directories.
    pub files: u64,
    /// Bytes covered.
    pub bytes: u64,
}

impl SelectionSummary {
    /// Totals for `entries`, which must not overlap (see [`collect_selected`]).
    pub fn of(tree: &Tree, entries: &[NodeIndex]) -> Self {
        entries.iter().fold(
            Self {
                entries: entries.len(),
                ..Self::default()
            },
            |acc, &idx| {
                let node = tree.node(idx);
                Self {
                    files: acc.files + node.file_count(),
                    bytes: acc.bytes + node.size,
                    ..acc
                }
            },
        )
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
