/// Post-scan tree operations.

pub mod prune;

pub use prune::prune;
