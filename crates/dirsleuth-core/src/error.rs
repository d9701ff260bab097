/// Errors that abort a scan or listing before any result is produced.
///
/// Per-entry failures during traversal are not errors at this level; they
/// travel inside the record stream and end up in `StatsSummary::errors`.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a root path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootProblem {
    #[error("does not exist")]
    NotFound,
    #[error("is not a directory")]
    NotADirectory,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: RootProblem },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub(crate) fn invalid_root(path: impl Into<PathBuf>, reason: RootProblem) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason,
        }
    }

    /// Map an I/O failure on `path`, turning "not found" into `InvalidRoot`.
    pub(crate) fn from_root_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::invalid_root(path, RootProblem::NotFound)
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
