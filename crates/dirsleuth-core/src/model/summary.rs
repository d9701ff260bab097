/// The statistics summary, the scan's sole output.
///
/// A plain value: presenters receive it by reference and never touch the
/// filesystem. Map fields use `BTreeMap` so serialised output is stable.
use super::entry::ErrorKind;
use crate::analysis::file_types::CategoryStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The largest regular file seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargestFile {
    pub path: PathBuf,
    pub size: u64,
}

/// An `(extension, total)` pair in a top-N ranking. The total is a byte
/// count or a file count depending on the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionTotal {
    pub extension: String,
    pub total: u64,
}

/// A per-entry failure captured during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    // ── Context ─────────────────────────────────────────
    pub root: PathBuf,
    /// Captured once when the scan started.
    pub scanned_at: DateTime<Utc>,

    // ── Structure ───────────────────────────────────────
    pub file_count: u64,
    pub dir_count: u64,
    pub symlink_count: u64,

    // ── Size ────────────────────────────────────────────
    /// Regular files, plus followed symlinks that resolve to files.
    pub total_size_bytes: u64,
    pub largest_file: Option<LargestFile>,

    // ── Composition ─────────────────────────────────────
    pub extension_sizes: BTreeMap<String, u64>,
    pub extension_counts: BTreeMap<String, u64>,
    pub top_extensions_by_size: Vec<ExtensionTotal>,
    pub top_extensions_by_count: Vec<ExtensionTotal>,
    pub categories: Vec<CategoryStats>,

    // ── Time ────────────────────────────────────────────
    pub oldest_modified: Option<DateTime<Utc>>,
    pub newest_modified: Option<DateTime<Utc>>,
    pub recent_file_count: u64,
    pub recency_window_days: u64,

    // ── Hygiene ─────────────────────────────────────────
    pub hidden_dir_count: u64,
    /// Regular files whose name starts with `.`.
    pub hidden_file_count: u64,
    pub empty_dir_count: u64,
    pub zero_byte_file_count: u64,

    // ── Errors ──────────────────────────────────────────
    pub error_count: u64,
    pub errors: Vec<EntryFailure>,
}

impl StatsSummary {
    /// Entries that received a classification (file, directory or symlink).
    pub fn classified_count(&self) -> u64 {
        self.file_count + self.dir_count + self.symlink_count
    }
}
