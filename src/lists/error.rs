use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading domain lists.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("cannot read domain list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("domain list {} line {line}: invalid entry {entry:?}", .path.display())]
    InvalidEntry {
        path: PathBuf,
        line: usize,
        entry: String,
    },
}

impl ListError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_entry(path: &std::path::Path, line: usize, entry: &str) -> Self {
        Self::InvalidEntry {
            path: path.to_path_buf(),
            line,
            entry: entry.to_string(),
        }
    }
}
