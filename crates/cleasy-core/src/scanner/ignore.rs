/// Ignore predicates: decide which directories the walker must not descend.
///
/// An ignored directory is not dropped from the tree. It is listed as empty
/// (see [`IgnoringLister`](super::lister::IgnoringLister)) and shows up as a
/// zero-sized directory.
use crate::error::IgnoreFileError;
use glob::Pattern;
use std::path::Path;

/// Decides whether a path should be excluded from the scan.
pub trait IgnorePredicate: Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&Path) -> bool + Sync,
{
    fn is_ignored(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Predicate that ignores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverIgnore;

impl IgnorePredicate for NeverIgnore {
    fn is_ignored(&self, _path: &Path) -> bool {
        false
    }
}

/// A list of paths and glob patterns to skip, usually read from a user's
/// ignore file.
///
/// One entry per line. Blank lines and lines starting with `#` are skipped,
/// and a trailing `/` is dropped. Each entry is matched against the whole
/// path handed to the lister, so entries are normally absolute paths such
/// as `/proc` or patterns such as `/home/*/.cache`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    patterns: Vec<Pattern>,
}

impl IgnoreList {
    /// Parse ignore-file contents.
    pub fn parse(contents: &str) -> Result<Self, IgnoreFileError> {
        let mut patterns = Vec::new();
        for (i, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = if line.len() > 1 {
                line.trim_end_matches('/')
            } else {
                line
            };
            let pattern = Pattern::new(line).map_err(|source| IgnoreFileError::Pattern {
                line: i + 1,
                source,
            })?;
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    /// Read and parse an ignore file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IgnoreFileError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| IgnoreFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl IgnorePredicate for IgnoreList {
    fn is_ignored(&self, path: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches_path(path))
    }
}
