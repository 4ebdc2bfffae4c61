/// Directory listing seam between the walker and the storage it scans.
///
/// The walker never touches the filesystem itself: it asks a [`DirLister`]
/// for the immediate children of each directory. [`FsLister`] is the real
/// implementation; tests substitute synthetic trees.
use super::ignore::IgnorePredicate;
use compact_str::CompactString;
use std::io;
use std::path::Path;
use tracing::debug;

/// One immediate child reported by a lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    pub name: CompactString,
    /// Size in bytes. Ignored for directories, whose size is aggregated.
    pub size: u64,
    pub is_dir: bool,
}

impl DirItem {
    pub fn file(name: impl Into<CompactString>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            is_dir: true,
        }
    }
}

/// Lists the immediate children of a directory.
///
/// Called concurrently from several walker tasks, hence `Sync`.
pub trait DirLister: Sync {
    fn list(&self, path: &Path) -> io::Result<Vec<DirItem>>;
}

impl<F> DirLister for F
where
    F: Fn(&Path) -> io::Result<Vec<DirItem>> + Sync,
{
    fn list(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        self(path)
    }
}

/// Lists real directories with `std::fs::read_dir`.
///
/// Symlinks are never followed: a link is reported as a file carrying the
/// size of the link itself. Entries whose metadata cannot be read (usually
/// because they vanished mid-listing) are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        let mut items = Vec::new();
        for dir_entry in std::fs::read_dir(path)? {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(err) => {
                    debug!("Skipping unreadable entry in {}: {err}", path.display());
                    continue;
                }
            };
            // DirEntry::metadata does not traverse symlinks.
            let meta = match dir_entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    debug!("Skipping {}: {err}", dir_entry.path().display());
                    continue;
                }
            };
            let name = CompactString::new(dir_entry.file_name().to_string_lossy());
            items.push(if meta.is_dir() {
                DirItem::dir(name)
            } else {
                DirItem::file(name, meta.len())
            });
        }
        Ok(items)
    }
}

/// Wraps a lister so that ignored paths list as empty.
///
/// The inner lister is never called for an ignored path, which therefore
/// still materialises as an empty directory in the tree.
#[derive(Debug)]
pub struct IgnoringLister<'a, L: ?Sized, P: ?Sized> {
    inner: &'a L,
    ignore: &'a P,
}

impl<'a, L: ?Sized, P: ?Sized> IgnoringLister<'a, L, P> {
    pub fn new(inner: &'a L, ignore: &'a P) -> Self {
        Self { inner, ignore }
    }
}

impl<L, P> DirLister for IgnoringLister<'_, L, P>
where
    L: DirLister + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    fn list(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        if self.ignore.is_ignored(path) {
            debug!("Ignoring {}", path.display());
            return Ok(Vec::new());
        }
        self.inner.list(path)
    }
}
