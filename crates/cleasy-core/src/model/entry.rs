/// A single node in the arena-allocated scan tree.
///
/// Entries are stored in a flat `Vec<Entry>` owned by [`Tree`](super::Tree).
/// Parent-child relationships use indices rather than pointers, so the tree
/// is owned top-down by the arena and the `parent` link is never an
/// ownership edge.
use compact_str::CompactString;
use std::path::PathBuf;

/// Lightweight handle into the arena `Vec<Entry>`.
///
/// Uses `u32` to keep handles small. Indices are never reused or shifted
/// while a tree is alive, so a `NodeIndex` is a stable identity for the
/// lifetime of the tree that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One filesystem object (file or directory) in the scan tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Last path component only. For the scan root this is the path as given.
    pub name: CompactString,

    /// Path of the object, built by joining names onto the scan root.
    pub full_path: PathBuf,

    /// `true` if this entry is a directory.
    pub is_dir: bool,

    /// Size in bytes. Raw size for files; for directories the sum of all
    /// descendant file sizes once the tree has been aggregated (zero before).
    pub size: u64,

    /// Depth relative to the scan root. The root sits at
    /// [`ROOT_LEVEL`](super::ROOT_LEVEL), its children one below that.
    pub level: i32,

    /// Number of file descendants (directories themselves are not counted).
    /// Always zero for files.
    pub descendant_count: u64,

    /// Ordered children. Empty (never absent) for files and for directories
    /// without visible contents.
    pub children: Vec<NodeIndex>,

    /// Parent entry. `None` for the root and for subtrees detached by pruning.
    pub parent: Option<NodeIndex>,
}

impl Entry {
    /// Create a file entry.
    pub fn new_file(
        name: CompactString,
        full_path: PathBuf,
        size: u64,
        level: i32,
        parent: Option<NodeIndex>,
    ) -> Self {
        Self {
            name,
            full_path,
            is_dir: false,
            size,
            level,
            descendant_count: 0,
            children: Vec::new(),
            parent,
        }
    }

    /// Create a directory entry with no children and zero size.
    pub fn new_dir(
        name: CompactString,
        full_path: PathBuf,
        level: i32,
        parent: Option<NodeIndex>,
    ) -> Self {
        Self {
            name,
            full_path,
            is_dir: true,
            size: 0,
            level,
            descendant_count: 0,
            children: Vec::new(),
            parent,
        }
    }

    /// Number of files this entry stands for: itself for a file, its
    /// aggregated descendants for a directory.
    #[inline]
    pub fn file_count(&self) -> u64 {
        if self.is_dir {
            self.descendant_count
        } else {
            1
        }
    }
}
