/// Small-directory pruning for display trees.
///
/// Drops directory children whose aggregated size is below a threshold.
/// Only directories are pruned: a single large file stays interesting under
/// a small-folder threshold, a small folder does not. Parents keep their
/// aggregated sizes, so totals still include the pruned bytes.
use crate::model::Tree;
use tracing::debug;

/// Remove every directory below `threshold` bytes, at any depth.
///
/// Removed subtrees are detached from the tree (their arena slots remain,
/// so other indices stay valid) and are reported as not attached from then
/// on. Applying the same threshold again changes nothing.
///
/// Sizes are read as they are, so the tree should be aggregated first.
/// Returns the number of directories removed.
pub fn prune(tree: &mut Tree, threshold: u64) -> usize {
    let mut removed = 0;
    let mut stack = vec![tree.root];
    while let Some(idx) = stack.pop() {
        let children = std::mem::take(&mut tree.nodes[idx.idx()].children);
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            let (is_dir, size) = {
                let node = &tree.nodes[child.idx()];
                (node.is_dir, node.size)
            };
            if is_dir && size < threshold {
                tree.nodes[child.idx()].parent = None;
                removed += 1;
                continue;
            }
            if is_dir {
                stack.push(child);
            }
            kept.push(child);
        }
        tree.nodes[idx.idx()].children = kept;
    }
    if removed > 0 {
        debug!("Pruned {removed} directories below {threshold} bytes");
    }
    removed
}
