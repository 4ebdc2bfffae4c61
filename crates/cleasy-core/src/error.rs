/// Error types for `cleasy-core`.
///
/// Only failures that the embedding application must react to cross the
/// library boundary. Unreadable subtrees, stale view handles and individual
/// deletion failures are absorbed and reported structurally instead.
use std::io;
use std::path::PathBuf;

/// Failure of a whole scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scan root itself could not be listed. Distinct from an empty
    /// tree so the caller can ask for a different path.
    #[error("cannot read scan root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker pool for directory listing could not be created.
    #[error("failed to build scanner thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The background scan thread could not be started.
    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] io::Error),

    /// The background scan thread panicked before producing a tree.
    #[error("scanner thread panicked")]
    Panicked,
}

/// Failure to load an ignore list.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreFileError {
    #[error("cannot read ignore file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid ignore pattern on line {line}: {source}")]
    Pattern {
        line: usize,
        #[source]
        source: glob::PatternError,
    },
}
