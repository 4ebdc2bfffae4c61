/// Arena-backed scan tree with a post-order aggregation pass.
///
/// All entries live in a single `Vec<Entry>`. Relationships between entries
/// use `NodeIndex` (a thin `u32` wrapper) rather than heap pointers, so there
/// are no reference cycles and handles stay valid for the tree's lifetime.
use super::entry::{Entry, NodeIndex};
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Level assigned to the scan root. Top-level children sit at level 0.
pub const ROOT_LEVEL: i32 = -1;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique generation number of a [`Tree`].
///
/// View state remembers the id of the tree it was derived from so that it
/// can tell when a rescan replaced the tree underneath it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node handle that remembers which tree issued it.
///
/// Resolving a `NodeRef` against a different tree, or against the same
/// tree after the node was pruned, yields nothing, so handles kept across a
/// rescan can never alias an unrelated entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    tree: TreeId,
    index: NodeIndex,
}

impl NodeRef {
    #[inline]
    pub fn index(self) -> NodeIndex {
        self.index
    }

    #[inline]
    pub fn tree_id(self) -> TreeId {
        self.tree
    }
}

/// The complete tree produced by one scan.
#[derive(Debug, Clone)]
pub struct Tree {
    id: TreeId,

    /// Arena: every entry in a flat vector. Pruned subtrees keep their
    /// slots so that indices never shift.
    pub nodes: Vec<Entry>,

    /// The scan root (always a directory).
    pub root: NodeIndex,
}

impl Tree {
    /// Create a tree holding only a root directory.
    pub fn new(root_name: impl Into<CompactString>, root_path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(root_name, root_path, 1)
    }

    /// Create a tree with pre-allocated room for `estimated_nodes` entries.
    pub fn with_capacity(
        root_name: impl Into<CompactString>,
        root_path: impl Into<PathBuf>,
        estimated_nodes: usize,
    ) -> Self {
        let mut nodes = Vec::with_capacity(estimated_nodes.max(1));
        nodes.push(Entry::new_dir(
            root_name.into(),
            root_path.into(),
            ROOT_LEVEL,
            None,
        ));
        Self {
            id: TreeId::next(),
            nodes,
            root: NodeIndex(0),
        }
    }

    /// Generation id of this tree.
    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Handle for `index` tied to this tree.
    #[inline]
    pub fn node_ref(&self, index: NodeIndex) -> NodeRef {
        NodeRef {
            tree: self.id,
            index,
        }
    }

    /// Index behind `node` if it was issued by this tree and is still attached.
    pub fn resolve(&self, node: NodeRef) -> Option<NodeIndex> {
        (node.tree == self.id && self.is_attached(node.index)).then_some(node.index)
    }

    fn push_child(&mut self, parent: NodeIndex, mut entry: Entry) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        entry.parent = Some(parent);
        self.nodes.push(entry);
        self.nodes[parent.idx()].children.push(idx);
        idx
    }

    /// Append a directory under `parent` and return its index.
    pub fn add_dir(&mut self, parent: NodeIndex, name: impl Into<CompactString>) -> NodeIndex {
        let name = name.into();
        let parent_node = &self.nodes[parent.idx()];
        let full_path = parent_node.full_path.join(name.as_str());
        let level = parent_node.level + 1;
        self.push_child(parent, Entry::new_dir(name, full_path, level, None))
    }

    /// Append a file of `size` bytes under `parent` and return its index.
    pub fn add_file(
        &mut self,
        parent: NodeIndex,
        name: impl Into<CompactString>,
        size: u64,
    ) -> NodeIndex {
        let name = name.into();
        let parent_node = &self.nodes[parent.idx()];
        let full_path = parent_node.full_path.join(name.as_str());
        let level = parent_node.level + 1;
        self.push_child(parent, Entry::new_file(name, full_path, size, level, None))
    }

    /// Recompute sizes, descendant counts and levels, then sort every
    /// directory's children by size, largest first.
    ///
    /// `root_level` is assigned to the root and each child gets its parent's
    /// level plus one. Directory aggregates are always recomputed from the
    /// children, never patched, so repeated calls are safe. Only entries
    /// reachable from the root take part.
    pub fn aggregate(&mut self, root_level: i32) {
        self.nodes[self.root.idx()].level = root_level;
        let order = self.preorder_assign_levels();

        // Pre-order reversed: every child is finished before its parent.
        for &idx in order.iter().rev() {
            if !self.nodes[idx.idx()].is_dir {
                continue;
            }
            let mut children = std::mem::take(&mut self.nodes[idx.idx()].children);
            let (size, descendants) = children.iter().fold((0u64, 0u64), |(size, count), c| {
                let child = &self.nodes[c.idx()];
                (size + child.size, count + child.file_count())
            });
            // Stable: equal sizes keep their insertion order.
            children.sort_by(|a, b| self.nodes[b.idx()].size.cmp(&self.nodes[a.idx()].size));

            let node = &mut self.nodes[idx.idx()];
            node.size = size;
            node.descendant_count = descendants;
            node.children = children;
        }
    }

    /// Depth-first pre-order over the attached tree, setting each child's
    /// level from its parent on the way down.
    fn preorder_assign_levels(&mut self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            let level = self.nodes[idx.idx()].level;
            for i in 0..self.nodes[idx.idx()].children.len() {
                let child = self.nodes[idx.idx()].children[i];
                self.nodes[child.idx()].level = level + 1;
                stack.push(child);
            }
        }
        order
    }

    /// Get the entry at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Entry {
        &self.nodes[index.idx()]
    }

    /// Direct children of a node, in their current order.
    #[inline]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index.idx()].children
    }

    /// The root entry.
    #[inline]
    pub fn root_entry(&self) -> &Entry {
        self.node(self.root)
    }

    /// Path of a node.
    #[inline]
    pub fn path(&self, index: NodeIndex) -> &Path {
        &self.nodes[index.idx()].full_path
    }

    /// Aggregated size of the whole tree.
    #[inline]
    pub fn total_size(&self) -> u64 {
        self.root_entry().size
    }

    /// `true` if `index` belongs to this tree and is still reachable from
    /// the root (i.e. it has not been pruned away).
    pub fn is_attached(&self, index: NodeIndex) -> bool {
        if index.idx() >= self.nodes.len() {
            return false;
        }
        let mut current = index;
        // A strict hierarchy has at most `len` ancestors.
        for _ in 0..self.nodes.len() {
            if current == self.root {
                return true;
            }
            match self.nodes[current.idx()].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// Entries reachable from the root, depth-first in child order.
    pub fn attached(&self) -> Vec<NodeIndex> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.nodes[idx.idx()].children.iter().rev().copied());
        }
        out
    }

    /// First attached entry called `name`, searching depth-first from the root.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.attached()
            .into_iter()
            .find(|&idx| self.nodes[idx.idx()].name == name)
    }

    /// Total number of entries in the arena, detached ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
