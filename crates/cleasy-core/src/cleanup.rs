/// Deleting selected entries from disk.
///
/// The scanner and view never modify the filesystem; an application that
/// wants to free the space it found hands the collected selection to
/// [`delete_entries`]. Each entry is removed on its own, so one failure
/// does not stop the rest of the batch.
use crate::model::{NodeIndex, Tree};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Removes files and directory trees.
pub trait Remover {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Removes from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// One entry that could not be removed.
#[derive(Debug)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of [`delete_entries`].
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// Entries removed.
    pub removed: usize,
    /// Files freed, counting the contents of removed directories.
    pub files_freed: u64,
    /// Bytes freed, as measured by the scan.
    pub bytes_freed: u64,
    pub failures: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Remove every entry in `entries` from disk.
///
/// `entries` should not overlap; use the output of
/// [`collect_selected`](crate::view::collect_selected). Directories are
/// removed recursively. The tree itself is not modified: rescan to see
/// the result.
pub fn delete_entries<R>(tree: &Tree, entries: &[NodeIndex], remover: &R) -> DeletionReport
where
    R: Remover + ?Sized,
{
    let mut report = DeletionReport::default();
    for &idx in entries {
        let entry = tree.node(idx);
        let result = if entry.is_dir {
            remover.remove_dir_all(&entry.full_path)
        } else {
            remover.remove_file(&entry.full_path)
        };
        match result {
            Ok(()) => {
                report.removed += 1;
                report.files_freed += entry.file_count();
                report.bytes_freed += entry.size;
            }
            Err(error) => {
                warn!("Could not delete {}: {error}", entry.full_path.display());
                report.failures.push(DeletionFailure {
                    path: entry.full_path.clone(),
                    error,
                });
            }
        }
    }
    info!(
        "Deleted {} of {} entries: {} files, {} bytes freed",
        report.removed,
        entries.len(),
        report.files_freed,
        report.bytes_freed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ROOT_LEVEL;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Builds the scan tree by hand to match what was written to `dir`.
    fn build(dir: &Path) -> Tree {
        fs::create_dir_all(dir.join("cache/nested")).unwrap();
        fs::write(dir.join("cache/a.tmp"), vec![0u8; 300]).unwrap();
        fs::write(dir.join("cache/nested/b.tmp"), vec![0u8; 200]).unwrap();
        fs::write(dir.join("notes.txt"), vec![0u8; 50]).unwrap();

        let mut tree = Tree::new("root", dir);
        let root = tree.root;
        let cache = tree.add_dir(root, "cache");
        tree.add_file(cache, "a.tmp", 300);
        let nested = tree.add_dir(cache, "nested");
        tree.add_file(nested, "b.tmp", 200);
        tree.add_file(root, "notes.txt", 50);
        tree.aggregate(ROOT_LEVEL);
        tree
    }

    #[test]
    fn deletes_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let tree = build(tmp.path());
        let targets = [tree.find("cache").unwrap(), tree.find("notes.txt").unwrap()];

        let report = delete_entries(&tree, &targets, &FsRemover);

        assert!(report.is_complete());
        assert_eq!(report.removed, 2);
        assert_eq!(report.files_freed, 3);
        assert_eq!(report.bytes_freed, 550);
        assert!(!tmp.path().join("cache").exists());
        assert!(!tmp.path().join("notes.txt").exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn missing_entry_is_reported_and_batch_continues() {
        let tmp = TempDir::new().unwrap();
        let tree = build(tmp.path());
        fs::remove_file(tmp.path().join("notes.txt")).unwrap();
        let targets = [tree.find("notes.txt").unwrap(), tree.find("cache").unwrap()];

        let report = delete_entries(&tree, &targets, &FsRemover);

        assert_eq!(report.removed, 1);
        assert_eq!(report.bytes_freed, 500);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, tmp.path().join("notes.txt"));
        assert_eq!(report.failures[0].error.kind(), io::ErrorKind::NotFound);
        assert!(!tmp.path().join("cache").exists());
    }

    struct Recorder {
        calls: Mutex<Vec<(&'static str, PathBuf)>>,
        fail: PathBuf,
    }

    impl Remover for Recorder {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.calls.lock().unwrap().push(("file", path.to_path_buf()));
            if path == self.fail {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            Ok(())
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            self.calls.lock().unwrap().push(("dir", path.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn uses_the_right_removal_per_kind() {
        let mut tree = Tree::new("r", "/r");
        let root = tree.root;
        let d = tree.add_dir(root, "d");
        tree.add_file(d, "x", 7);
        let f = tree.add_file(root, "f", 9);
        tree.aggregate(ROOT_LEVEL);

        let remover = Recorder {
            calls: Mutex::new(Vec::new()),
            fail: PathBuf::from("/r/f"),
        };
        let report = delete_entries(&tree, &[d, f], &remover);

        assert_eq!(
            *remover.calls.lock().unwrap(),
            [
                ("dir", PathBuf::from("/r/d")),
                ("file", PathBuf::from("/r/f")),
            ]
        );
        assert_eq!(report.removed, 1);
        assert_eq!(report.files_freed, 1);
        assert_eq!(report.bytes_freed, 7);
        assert_eq!(report.failures[0].error.kind(), io::ErrorKind::PermissionDenied);
    }
}
