/// Scanner module: walks a directory subtree into an aggregated [`Tree`].
///
/// The pipeline is walk → aggregate → optional prune. [`scan`] runs it on the
/// calling thread; [`start_scan`] runs it on a background thread and hands
/// back a [`ScanHandle`] for progress and the result.
///
/// The scanner never reads the filesystem directly. It goes through a
/// [`DirLister`] (normally [`FsLister`]) wrapped with an
/// [`IgnorePredicate`]. Scans cannot be cancelled: a scan runs to completion
/// or fails at the root, and a caller that loses interest discards the
/// result.
pub mod ignore;
pub mod lister;
pub mod permit;
pub mod progress;
pub mod walker;

pub use ignore::{IgnoreList, IgnorePredicate, NeverIgnore};
pub use lister::{DirItem, DirLister, FsLister, IgnoringLister};
pub use progress::{progress_channel, ProgressReceiver, ProgressSender, ProgressTally};
pub use walker::{walk, walk_with_options};

use crate::analysis::prune;
use crate::error::ScanError;
use crate::model::{Tree, ROOT_LEVEL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Tuning knobs for a scan.
///
/// Serialisable so the embedding application can keep it in its own
/// settings file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Maximum directory listings in flight at once. Defaults to twice the
    /// number of logical CPUs.
    pub max_in_flight: usize,

    /// Worker threads in the walker pool. Defaults to the number of logical
    /// CPUs.
    pub threads: usize,

    /// Directories smaller than this many bytes are pruned from the finished
    /// tree. `0` keeps everything.
    pub prune_threshold: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let cpus = num_cpus::get();
        Self {
            max_in_flight: 2 * cpus,
            threads: cpus,
            prune_threshold: 0,
        }
    }
}

/// Walk `root`, aggregate the result and prune it if configured.
///
/// `progress` is closed only once the returned tree is final, so a consumer
/// seeing the channel disconnect knows the scan is over.
pub fn scan<L, P>(
    root: impl AsRef<Path>,
    lister: &L,
    ignore: &P,
    progress: ProgressSender,
    options: &ScanOptions,
) -> Result<Tree, ScanError>
where
    L: DirLister + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    let root = root.as_ref();
    let start = Instant::now();
    info!("Starting scan of {}", root.display());

    let result = walker::walk_tree(root, lister, ignore, &progress, options).map(|mut tree| {
        tree.aggregate(ROOT_LEVEL);
        if options.prune_threshold > 0 {
            prune(&mut tree, options.prune_threshold);
        }
        tree
    });
    drop(progress);

    match &result {
        Ok(tree) => info!(
            "Scan of {} complete: {} files, {} bytes in {:?}",
            root.display(),
            tree.root_entry().descendant_count,
            tree.total_size(),
            start.elapsed()
        ),
        Err(err) => warn!("Scan of {} failed: {err}", root.display()),
    }
    result
}

/// Handle to a scan running on a background thread.
pub struct ScanHandle {
    /// Subdirectory counts from the walker. Disconnects when the scan ends.
    pub progress_rx: ProgressReceiver,
    thread: thread::JoinHandle<Result<Tree, ScanError>>,
}

impl ScanHandle {
    /// `true` once the scan thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the scan and take its result.
    pub fn join(self) -> Result<Tree, ScanError> {
        self.thread.join().map_err(|_| ScanError::Panicked)?
    }
}

/// Start a scan of `root` on a new background thread.
pub fn start_scan<L, P>(
    root: PathBuf,
    lister: L,
    ignore: P,
    options: ScanOptions,
) -> Result<ScanHandle, ScanError>
where
    L: DirLister + Send + 'static,
    P: IgnorePredicate + Send + 'static,
{
    let (progress_tx, progress_rx) = progress_channel();
    let thread = thread::Builder::new()
        .name("cleasy-scanner".into())
        .spawn(move || scan(&root, &lister, &ignore, progress_tx, &options))
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        progress_rx,
        thread,
    })
}
