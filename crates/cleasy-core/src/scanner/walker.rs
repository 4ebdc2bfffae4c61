/// Concurrent directory walker.
///
/// Every directory is listed exactly once. Subdirectories are handed to a
/// rayon scope as separate tasks, so unrelated subtrees are listed in
/// parallel; files become entries straight away. Children end up in
/// listing order (files first) however the tasks were scheduled.
///
/// # Concurrency discipline
///
/// - A [`Permits`] limiter caps the number of listings in flight. A task
///   holds its permit only while listing one directory and attaching its
///   own result; it never waits for its children, so the cap cannot
///   deadlock however deep the tree is.
/// - While the walk runs, each directory lives in a `PendingDir` whose
///   children vector is guarded by its own mutex. Sibling tasks contend only
///   on their common parent; there is no global lock.
/// - The rayon scope is the join barrier. Once it returns, every task has
///   finished and the pending tree is converted into the index arena
///   single-threaded.
use super::ignore::IgnorePredicate;
use super::lister::{DirItem, DirLister, IgnoringLister};
use super::permit::Permits;
use super::progress::ProgressSender;
use super::ScanOptions;
use crate::error::ScanError;
use crate::model::{NodeIndex, Tree};
use compact_str::CompactString;
use parking_lot::Mutex;
use rayon::Scope;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A directory that has been listed while the walk is still running.
struct PendingDir {
    name: CompactString,
    path: PathBuf,
    children: Mutex<Vec<PendingChild>>,
}

enum PendingChild {
    File(DirItem),
    /// A listed subdirectory and its position among its parent's
    /// subdirectories in listing order.
    Dir(usize, Arc<PendingDir>),
}

/// State shared by all listing tasks of one walk.
struct WalkContext<'a, L: ?Sized> {
    lister: &'a L,
    permits: Permits,
    progress: &'a ProgressSender,
    entries: AtomicUsize,
    unreadable: AtomicUsize,
}

/// Walk `root` with default [`ScanOptions`].
///
/// See [`walk_with_options`].
pub fn walk<L, P>(
    root: impl AsRef<Path>,
    lister: &L,
    ignore: &P,
    progress: ProgressSender,
) -> Result<Tree, ScanError>
where
    L: DirLister + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    walk_with_options(root, lister, ignore, progress, &ScanOptions::default())
}

/// Walk `root` and build the (not yet aggregated) entry tree.
///
/// Blocks until the whole subtree is materialised. `progress` is dropped
/// before returning, which closes the channel for the consumer; this
/// happens on failure too.
///
/// Directories other than the root that cannot be listed are logged and
/// left out of their parent. If the root itself cannot be listed the walk
/// fails with [`ScanError::RootUnreadable`].
pub fn walk_with_options<L, P>(
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
    let result = walk_tree(root.as_ref(), lister, ignore, &progress, options);
    drop(progress);
    result
}

/// Walk without taking ownership of the progress sender, so callers can
/// finish further work on the tree before closing the channel.
pub(crate) fn walk_tree<L, P>(
    root: &Path,
    lister: &L,
    ignore: &P,
    progress: &ProgressSender,
    options: &ScanOptions,
) -> Result<Tree, ScanError>
where
    L: DirLister + ?Sized,
    P: IgnorePredicate + ?Sized,
{
    let start = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .thread_name(|i| format!("cleasy-walk-{i}"))
        .build()?;

    let lister = IgnoringLister::new(lister, ignore);
    let ctx = WalkContext {
        lister: &lister,
        permits: Permits::new(options.max_in_flight),
        progress,
        entries: AtomicUsize::new(0),
        unreadable: AtomicUsize::new(0),
    };
    debug!(
        "Walking {} with {} threads, {} listings in flight",
        root.display(),
        options.threads.max(1),
        ctx.permits.capacity()
    );

    let root_name = root_display_name(root);
    let shared = &ctx;
    let pending = pool.scope(|s| {
        let _permit = shared.permits.acquire();
        list_dir(s, shared, root.to_path_buf(), root_name)
    });

    let pending = pending.map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let tree = into_tree(&pending, ctx.entries.load(Ordering::Relaxed) + 1);
    info!(
        "Walked {}: {} entries, {} unreadable directories in {:?}",
        root.display(),
        tree.len(),
        ctx.unreadable.load(Ordering::Relaxed),
        start.elapsed()
    );
    Ok(tree)
}

/// List one directory, record its files and spawn a task per subdirectory.
///
/// Returns as soon as the listing is recorded; subdirectory tasks attach
/// themselves to the returned `PendingDir` when they complete.
fn list_dir<'s, L>(
    scope: &Scope<'s>,
    ctx: &'s WalkContext<'s, L>,
    path: PathBuf,
    name: CompactString,
) -> io::Result<Arc<PendingDir>>
where
    L: DirLister + ?Sized,
{
    let items = ctx.lister.list(&path)?;
    ctx.entries.fetch_add(items.len(), Ordering::Relaxed);

    let (subdirs, files): (Vec<DirItem>, Vec<DirItem>) =
        items.into_iter().partition(|item| item.is_dir);
    let mut children = Vec::with_capacity(files.len() + subdirs.len());
    children.extend(files.into_iter().map(PendingChild::File));

    let dir = Arc::new(PendingDir {
        name,
        path,
        children: Mutex::new(children),
    });

    let subdir_count = subdirs.len();
    for (position, item) in subdirs.into_iter().enumerate() {
        let parent = Arc::clone(&dir);
        let child_path = dir.path.join(item.name.as_str());
        scope.spawn(move |s| {
            let _permit = ctx.permits.acquire();
            match list_dir(s, ctx, child_path.clone(), item.name) {
                Ok(child) => parent
                    .children
                    .lock()
                    .push(PendingChild::Dir(position, child)),
                Err(err) => {
                    ctx.unreadable.fetch_add(1, Ordering::Relaxed);
                    warn!("Skipping unreadable directory {}: {err}", child_path.display());
                }
            }
        });
    }

    if subdir_count > 0 {
        // A consumer that hung up only loses progress, not the scan.
        let _ = ctx.progress.send(subdir_count);
    }
    Ok(dir)
}

/// Move the finished pending tree into an index arena.
fn into_tree(root: &PendingDir, estimated_nodes: usize) -> Tree {
    let mut tree = Tree::with_capacity(root.name.clone(), root.path.clone(), estimated_nodes);
    let mut stack: Vec<(Arc<PendingDir>, NodeIndex)> = Vec::new();
    let root_idx = tree.root;
    attach_children(&mut tree, root, root_idx, &mut stack);
    while let Some((dir, idx)) = stack.pop() {
        attach_children(&mut tree, &dir, idx, &mut stack);
    }
    tree
}

fn attach_children(
    tree: &mut Tree,
    dir: &PendingDir,
    idx: NodeIndex,
    stack: &mut Vec<(Arc<PendingDir>, NodeIndex)>,
) {
    let mut children = std::mem::take(&mut *dir.children.lock());
    // Files were recorded first, in listing order; subdirectories arrived in
    // completion order and go back to listing order here.
    children.sort_by_key(|child| match child {
        PendingChild::File(_) => 0,
        PendingChild::Dir(position, _) => position + 1,
    });
    for child in children {
        match child {
            PendingChild::File(item) => {
                tree.add_file(idx, item.name, item.size);
            }
            PendingChild::Dir(_, sub) => {
                let sub_idx = tree.add_dir(idx, sub.name.clone());
                stack.push((sub, sub_idx));
            }
        }
    }
}

/// Display name for the scan root: its last component, or the whole path
/// for roots such as `/` that have none.
fn root_display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}
