/// Flattened, expandable view of a scan tree with per-entry selection.
///
/// [`TreeView`] keeps the list of rows a front end renders, plus two sets of
/// per-entry flags: which directories are expanded and which entries are
/// selected. The flags outlive the rows, so collapsing a directory and
/// opening it again brings back exactly what was open and ticked inside it.
///
/// Every operation takes the tree the caller currently holds. When that is
/// not the tree the view was built from (a rescan replaced it), the view
/// starts over from the new tree's first level with no flags set. Entries
/// are addressed with [`NodeRef`]s, so a handle from an earlier tree, or
/// one pointing into a pruned subtree, is ignored.
pub mod selection;

pub use selection::{collect_selected, SelectionSummary};

use crate::model::{NodeIndex, NodeRef, Tree, TreeId};
use std::collections::HashSet;
use tracing::debug;

/// A single row in the flattened tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    pub node: NodeRef,
    /// Level of the entry, copied from the tree.
    pub level: i32,
    pub selected: bool,
    pub expanded: bool,
}

impl VisibleRow {
    #[inline]
    pub fn index(&self) -> NodeIndex {
        self.node.index()
    }
}

#[derive(Debug, Clone)]
pub struct TreeView {
    tree_id: TreeId,
    rows: Vec<VisibleRow>,
    expanded: HashSet<NodeIndex>,
    selected: HashSet<NodeIndex>,
}

impl TreeView {
    /// A view of `tree` showing the root's children, all collapsed.
    pub fn new(tree: &Tree) -> Self {
        let mut view = Self {
            tree_id: tree.id(),
            rows: Vec::new(),
            expanded: HashSet::new(),
            selected: HashSet::new(),
        };
        view.rebuild_rows(tree);
        view
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    /// Id of the tree the rows were built from.
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    pub fn is_selected(&self, node: NodeRef) -> bool {
        node.tree_id() == self.tree_id && self.selected.contains(&node.index())
    }

    pub fn is_expanded(&self, node: NodeRef) -> bool {
        node.tree_id() == self.tree_id && self.expanded.contains(&node.index())
    }

    /// Rebuild the rows from `tree`.
    ///
    /// Flags survive when `tree` is the tree the view already tracks; flags
    /// on entries that are no longer attached are dropped. A different tree
    /// resets the view.
    pub fn rebuild(&mut self, tree: &Tree) {
        if self.sync(tree) {
            return;
        }
        self.expanded.retain(|&idx| tree.is_attached(idx));
        self.selected.retain(|&idx| tree.is_attached(idx));
        self.rebuild_rows(tree);
    }

    /// Show the children of `node` directly below it.
    ///
    /// Children that were expanded before come back expanded, recursively.
    /// Returns `false` without changing anything when `node` is not a
    /// visible, collapsed directory of `tree`.
    pub fn expand(&mut self, tree: &Tree, node: NodeRef) -> bool {
        let Some(pos) = self.visible_dir(tree, node) else {
            return false;
        };
        if self.rows[pos].expanded {
            return false;
        }
        let idx = node.index();
        self.expanded.insert(idx);
        self.rows[pos].expanded = true;

        let mut inserted = Vec::new();
        for &child in tree.children(idx) {
            self.push_subtree(tree, child, &mut inserted);
        }
        debug!(
            "Expanded {}: {} rows shown",
            tree.path(idx).display(),
            inserted.len()
        );
        self.rows.splice(pos + 1..pos + 1, inserted);
        true
    }

    /// Hide everything below `node`.
    ///
    /// Only `node` itself is marked collapsed; directories inside it keep
    /// their flags for the next [`expand`](Self::expand).
    pub fn collapse(&mut self, tree: &Tree, node: NodeRef) -> bool {
        let Some(pos) = self.visible_dir(tree, node) else {
            return false;
        };
        if !self.rows[pos].expanded {
            return false;
        }
        let level = self.rows[pos].level;
        let start = pos + 1;
        let end = self.rows[start..]
            .iter()
            .position(|row| row.level <= level)
            .map_or(self.rows.len(), |offset| start + offset);
        self.rows.drain(start..end);
        self.rows[pos].expanded = false;
        self.expanded.remove(&node.index());
        true
    }

    /// Expand a collapsed directory or collapse an expanded one.
    pub fn toggle_expand(&mut self, tree: &Tree, node: NodeRef) -> bool {
        if self.is_expanded(node) && tree.id() == self.tree_id {
            self.collapse(tree, node)
        } else {
            self.expand(tree, node)
        }
    }

    /// Mark `node` selected. Returns `true` if the flag changed.
    ///
    /// The scan root cannot be selected; select its children instead.
    pub fn select(&mut self, tree: &Tree, node: NodeRef) -> bool {
        self.set_selected(tree, node, true)
    }

    /// Clear the selection flag of `node`. Returns `true` if the flag changed.
    pub fn deselect(&mut self, tree: &Tree, node: NodeRef) -> bool {
        self.set_selected(tree, node, false)
    }

    pub fn toggle_select(&mut self, tree: &Tree, node: NodeRef) -> bool {
        let on = !self.is_selected(node);
        self.set_selected(tree, node, on)
    }

    /// Forget every selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    /// Topmost selected entries, depth-first from the root's children.
    ///
    /// A selected directory covers everything inside it, so nothing below it
    /// is reported separately.
    pub fn collect_selected(&self, tree: &Tree) -> Vec<NodeIndex> {
        if tree.id() != self.tree_id {
            return Vec::new();
        }
        collect_selected(tree, tree.children(tree.root), &self.selected)
    }

    /// Totals for [`collect_selected`](Self::collect_selected).
    pub fn summary(&self, tree: &Tree) -> SelectionSummary {
        SelectionSummary::of(tree, &self.collect_selected(tree))
    }

    fn set_selected(&mut self, tree: &Tree, node: NodeRef, on: bool) -> bool {
        self.sync(tree);
        let Some(idx) = tree.resolve(node) else {
            return false;
        };
        // The root is never a row and never collected.
        if idx == tree.root {
            return false;
        }
        let changed = if on {
            self.selected.insert(idx)
        } else {
            self.selected.remove(&idx)
        };
        if changed {
            for row in self.rows.iter_mut().filter(|row| row.node == node) {
                row.selected = on;
            }
        }
        changed
    }

    /// Row position of `node` if it is an attached directory shown right now.
    fn visible_dir(&mut self, tree: &Tree, node: NodeRef) -> Option<usize> {
        self.sync(tree);
        let idx = tree.resolve(node)?;
        if !tree.node(idx).is_dir {
            return None;
        }
        self.rows.iter().position(|row| row.node == node)
    }

    /// Start over if `tree` is not the tree this view tracks. Returns `true`
    /// when it did.
    fn sync(&mut self, tree: &Tree) -> bool {
        if tree.id() == self.tree_id {
            return false;
        }
        debug!("Tree replaced, resetting view");
        self.tree_id = tree.id();
        self.expanded.clear();
        self.selected.clear();
        self.rebuild_rows(tree);
        true
    }

    fn rebuild_rows(&mut self, tree: &Tree) {
        let mut rows = Vec::new();
        for &child in tree.children(tree.root) {
            self.push_subtree(tree, child, &mut rows);
        }
        self.rows = rows;
    }

    /// Append the row for `start` and, where expanded, the rows below it.
    fn push_subtree(&self, tree: &Tree, start: NodeIndex, out: &mut Vec<VisibleRow>) {
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = tree.node(idx);
            let expanded = node.is_dir && self.expanded.contains(&idx);
            out.push(VisibleRow {
                node: tree.node_ref(idx),
                level: node.level,
                selected: self.selected.contains(&idx),
                expanded,
            });
            if expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prune;
    use crate::model::ROOT_LEVEL;

    /// b{ c=100, d{ e=50, f=30, g{ h=10, i=20 } }, k{ l=5 } }
    fn sample() -> Tree {
        let mut tree = Tree::new("b", "b");
        let root = tree.root;
        tree.add_file(root, "c", 100);
        let d = tree.add_dir(root, "d");
        tree.add_file(d, "e", 50);
        tree.add_file(d, "f", 30);
        let g = tree.add_dir(d, "g");
        tree.add_file(g, "h", 10);
        tree.add_file(g, "i", 20);
        let k = tree.add_dir(root, "k");
        tree.add_file(k, "l", 5);
        tree.aggregate(ROOT_LEVEL);
        tree
    }

    fn handle(tree: &Tree, name: &str) -> NodeRef {
        tree.node_ref(tree.find(name).unwrap())
    }

    fn shown(view: &TreeView, tree: &Tree) -> Vec<String> {
        view.rows()
            .iter()
            .map(|row| tree.node(row.index()).name.to_string())
            .collect()
    }

    #[test]
    fn new_view_shows_first_level_collapsed() {
        let tree = sample();
        let view = TreeView::new(&tree);

        assert_eq!(shown(&view, &tree), ["d", "c", "k"]);
        assert!(view.rows().iter().all(|r| !r.expanded && !r.selected));
        assert!(view.rows().iter().all(|r| r.level == 0));
    }

    #[test]
    fn expand_inserts_children_after_the_row() {
        let tree = sample();
        let mut view = TreeView::new(&tree);

        assert!(view.expand(&tree, handle(&tree, "d")));
        assert_eq!(shown(&view, &tree), ["d", "e", "f", "g", "c", "k"]);
        assert!(view.rows()[0].expanded);
        assert!(view.rows()[1..4].iter().all(|r| r.level == 1));

        // Already expanded.
        assert!(!view.expand(&tree, handle(&tree, "d")));
    }

    #[test]
    fn collapse_removes_exactly_what_expand_added() {
        let tree = sample();
        let mut view = TreeView::new(&tree);
        let before = view.rows().to_vec();

        view.expand(&tree, handle(&tree, "k"));
        assert_eq!(view.rows().len(), before.len() + 1);
        assert!(view.collapse(&tree, handle(&tree, "k")));
        assert_eq!(view.rows(), before.as_slice());
        assert!(!view.collapse(&tree, handle(&tree, "k")));
    }

    #[test]
    fn reexpanding_restores_nested_state() {
        let tree = sample();
        let mut view = TreeView::new(&tree);

        view.expand(&tree, handle(&tree, "d"));
        view.expand(&tree, handle(&tree, "g"));
        view.select(&tree, handle(&tree, "i"));
        let open = view.rows().to_vec();
        assert_eq!(shown(&view, &tree), ["d", "e", "f", "g", "i", "h", "c", "k"]);

        view.collapse(&tree, handle(&tree, "d"));
        assert_eq!(shown(&view, &tree), ["d", "c", "k"]);
        assert!(view.is_expanded(handle(&tree, "g")));

        view.expand(&tree, handle(&tree, "d"));
        assert_eq!(view.rows(), open.as_slice());
        assert!(view.rows()[4].selected);
    }

    #[test]
    fn toggles_flip_state() {
        let tree = sample();
        let mut view = TreeView::new(&tree);
        let d = handle(&tree, "d");

        assert!(view.toggle_expand(&tree, d));
        assert!(view.is_expanded(d));
        assert!(view.toggle_expand(&tree, d));
        assert!(!view.is_expanded(d));

        assert!(view.toggle_select(&tree, d));
        assert!(view.is_selected(d) && view.rows()[0].selected);
        assert!(view.toggle_select(&tree, d));
        assert!(!view.is_selected(d) && !view.rows()[0].selected);
    }

    #[test]
    fn files_and_hidden_rows_do_not_expand() {
        let tree = sample();
        let mut view = TreeView::new(&tree);

        assert!(!view.expand(&tree, handle(&tree, "c")));
        // g is a directory, but d is still collapsed.
        assert!(!view.expand(&tree, handle(&tree, "g")));
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn select_and_deselect_report_changes() {
        let tree = sample();
        let mut view = TreeView::new(&tree);
        let c = handle(&tree, "c");

        assert!(view.select(&tree, c));
        assert!(!view.select(&tree, c));
        assert!(view.deselect(&tree, c));
        assert!(!view.deselect(&tree, c));
    }

    #[test]
    fn root_cannot_be_selected() {
        let tree = sample();
        let mut view = TreeView::new(&tree);
        let root = tree.node_ref(tree.root);

        assert!(!view.select(&tree, root));
        assert!(!view.toggle_select(&tree, root));
        assert!(!view.is_selected(root));
        assert!(view.collect_selected(&tree).is_empty());
        assert!(view.summary(&tree).is_empty());
    }

    #[test]
    fn stale_handles_are_ignored() {
        let old = sample();
        let mut view = TreeView::new(&old);
        view.expand(&old, handle(&old, "d"));
        view.select(&old, handle(&old, "c"));

        let new = sample();
        assert!(!view.expand(&new, handle(&old, "k")));
        assert!(!view.select(&new, handle(&old, "c")));

        // The rescan reset the view onto the new tree.
        assert_eq!(view.tree_id(), new.id());
        assert_eq!(shown(&view, &new), ["d", "c", "k"]);
        assert!(view.rows().iter().all(|r| !r.expanded && !r.selected));
        assert!(view.collect_selected(&new).is_empty());

        assert!(view.expand(&new, handle(&new, "k")));
    }

    #[test]
    fn pruned_entries_are_ignored() {
        let mut tree = sample();
        let mut view = TreeView::new(&tree);
        let g = handle(&tree, "g");
        view.expand(&tree, handle(&tree, "d"));
        view.select(&tree, g);

        prune(&mut tree, 40);
        assert!(!view.select(&tree, g));
        assert!(!view.expand(&tree, g));

        view.rebuild(&tree);
        assert!(!view.is_selected(g));
        assert_eq!(shown(&view, &tree), ["d", "e", "f", "c"]);
    }

    #[test]
    fn collects_and_summarises_selection() {
        let tree = sample();
        let mut view = TreeView::new(&tree);
        view.expand(&tree, handle(&tree, "d"));
        view.expand(&tree, handle(&tree, "g"));
        view.select(&tree, handle(&tree, "i"));
        view.select(&tree, handle(&tree, "d"));
        view.select(&tree, handle(&tree, "k"));

        let picked: Vec<&str> = view
            .collect_selected(&tree)
            .iter()
            .map(|&n| tree.node(n).name.as_str())
            .collect();
        assert_eq!(picked, ["d", "k"]);
        assert_eq!(
            view.summary(&tree),
            SelectionSummary {
                entries: 2,
                files: 5,
                bytes: 115,
            }
        );

        view.clear_selection();
        assert!(view.summary(&tree).is_empty());
        assert!(view.rows().iter().all(|r| !r.selected));
    }
}
