/// A single visited filesystem object, as produced by the scanner.
///
/// Records are transient: the scanner yields them one at a time and the
/// aggregator consumes each immediately. Nothing holds on to them after the
/// scan completes.
use compact_str::CompactString;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Classification of a visited entry. The classes are disjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// The entry could not be classified (its `lstat` failed, or it is a
    /// FIFO, socket or device).
    Unknown,
}

/// Why a per-entry operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    /// Vanished between listing and stat, or a dangling symlink.
    NotFound,
    /// A followed symlink resolved to a directory that was already entered.
    CycleDetected,
    /// FIFO, socket, block or character device.
    Unsupported,
    Other,
}

impl ErrorKind {
    /// Classify an OS error.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::CycleDetected => "cycle detected",
            Self::Unsupported => "unsupported entry type",
            Self::Other => "other",
        }
    }
}

/// Error descriptor attached to a record that could not be fully read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EntryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn from_io(err: &io::Error) -> Self {
        Self::new(ErrorKind::from_io(err), err.to_string())
    }
}

/// One record per visited entry.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryRecord {
    /// Path as reached from the scan root.
    pub path: PathBuf,

    pub kind: EntryKind,

    /// Kind of the target for a symlink that was followed. `None` for
    /// everything else, including symlinks that were not followed.
    pub target_kind: Option<EntryKind>,

    /// Logical size. Zero for directories and unfollowed symlinks; the
    /// target's size for a followed symlink to a file.
    pub size_bytes: u64,

    pub modified_at: Option<SystemTime>,

    /// Lowercase suffix with the leading dot (`".rs"`), or empty.
    pub extension: CompactString,

    /// Directories only: the name starts with `.`.
    pub is_hidden: bool,

    /// Directories only: the directory has no children at all.
    pub is_empty_dir: bool,

    pub error: Option<EntryError>,
}

impl EntryRecord {
    /// A blank record of the given kind. Callers fill in what they learned.
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        Self {
            path,
            kind,
            target_kind: None,
            size_bytes: 0,
            modified_at: None,
            extension: CompactString::default(),
            is_hidden: false,
            is_empty_dir: false,
            error: None,
        }
    }

    /// A record for an entry that failed with `error`.
    pub fn failed(path: PathBuf, kind: EntryKind, error: EntryError) -> Self {
        let mut record = Self::new(path, kind);
        record.error = Some(error);
        record
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Lowercased extension of `path` including the leading dot.
///
/// Follows the usual suffix rules: `archive.tar.gz` gives `.gz`, while
/// dot-files such as `.bashrc` and names ending in a bare dot have none.
pub fn extension_of(path: &Path) -> CompactString {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => {
            let mut out = CompactString::with_capacity(ext.len() + 1);
            out.push('.');
            for ch in ext.chars() {
                out.extend(ch.to_lowercase());
            }
            out
        }
        _ => CompactString::default(),
    }
}

/// `true` if the final path component starts with the hidden-file marker.
pub fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
