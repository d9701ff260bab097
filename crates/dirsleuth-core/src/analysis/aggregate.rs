/// Folds the scanner's record stream into one [`StatsSummary`].
///
/// The fold is a single pass with running counters. Only the two top-N
/// extension rankings need sorting, and those are produced once at
/// [`Aggregator::finish`] with a decorate-sort-undecorate pass over the
/// per-extension maps. The largest file needs only one extreme, so it is a
/// running max instead of a sort.
use super::file_types::analyse_categories;
use crate::model::entry::is_hidden_name;
use crate::model::{EntryFailure, EntryKind, EntryRecord, ExtensionTotal, LargestFile, StatsSummary};
use crate::scanner::ScanOptions;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::SystemTime;

const SECS_PER_DAY: u64 = 86_400;

pub struct Aggregator<'a> {
    options: &'a ScanOptions,
    root: PathBuf,
    scan_time: SystemTime,

    file_count: u64,
    dir_count: u64,
    symlink_count: u64,
    hidden_dir_count: u64,
    hidden_file_count: u64,
    empty_dir_count: u64,
    zero_byte_file_count: u64,
    recent_file_count: u64,

    total_size_bytes: u64,
    largest_file: Option<LargestFile>,

    extension_size: HashMap<CompactString, u64>,
    extension_count: HashMap<CompactString, u64>,

    oldest: Option<SystemTime>,
    newest: Option<SystemTime>,

    errors: Vec<EntryFailure>,
}

impl<'a> Aggregator<'a> {
    /// `scan_time` anchors the recency window for the whole fold.
    pub fn new(root: impl Into<PathBuf>, options: &'a ScanOptions, scan_time: SystemTime) -> Self {
        Self {
            options,
            root: root.into(),
            scan_time,
            file_count: 0,
            dir_count: 0,
            symlink_count: 0,
            hidden_dir_count: 0,
            hidden_file_count: 0,
            empty_dir_count: 0,
            zero_byte_file_count: 0,
            recent_file_count: 0,
            total_size_bytes: 0,
            largest_file: None,
            extension_size: HashMap::new(),
            extension_count: HashMap::new(),
            oldest: None,
            newest: None,
            errors: Vec::new(),
        }
    }

    /// Fold one record.
    ///
    /// Classification is counted even for records carrying an error, so an
    /// unreadable directory still counts as a directory, and a hidden one as
    /// hidden. Nothing else about an error record is folded.
    pub fn fold(&mut self, mut record: EntryRecord) {
        match record.kind {
            EntryKind::File => self.file_count += 1,
            EntryKind::Directory => {
                self.dir_count += 1;
                if record.is_hidden {
                    self.hidden_dir_count += 1;
                }
            }
            EntryKind::Symlink => self.symlink_count += 1,
            EntryKind::Unknown => {}
        }

        if let Some(error) = record.error.take() {
            self.errors.push(EntryFailure {
                path: record.path,
                kind: error.kind,
                message: error.message,
            });
            return;
        }

        match (record.kind, record.target_kind) {
            (EntryKind::File, _) => self.fold_file(record),
            (EntryKind::Directory, _) => {
                if record.is_empty_dir {
                    self.empty_dir_count += 1;
                }
            }
            // Only present when symlinks are followed.
            (EntryKind::Symlink, Some(EntryKind::File)) => {
                self.total_size_bytes += record.size_bytes;
            }
            _ => {}
        }
    }

    fn fold_file(&mut self, record: EntryRecord) {
        let size = record.size_bytes;
        self.total_size_bytes += size;
        if size == 0 {
            self.zero_byte_file_count += 1;
        }
        if is_hidden_name(&record.path) {
            self.hidden_file_count += 1;
        }

        *self
            .extension_size
            .entry(record.extension.clone())
            .or_insert(0) += size;
        *self.extension_count.entry(record.extension).or_insert(0) += 1;

        if let Some(modified) = record.modified_at {
            self.oldest = Some(self.oldest.map_or(modified, |t| t.min(modified)));
            self.newest = Some(self.newest.map_or(modified, |t| t.max(modified)));
            if self.is_recent(modified) {
                self.recent_file_count += 1;
            }
        }

        // Strictly larger only: the first file reached wins a tie.
        let replace = match &self.largest_file {
            None => true,
            Some(current) => size > current.size,
        };
        if replace {
            self.largest_file = Some(LargestFile {
                path: record.path,
                size,
            });
        }
    }

    /// Within the window of the scan time. A timestamp in the future is
    /// treated as recent.
    fn is_recent(&self, modified: SystemTime) -> bool {
        match self.scan_time.duration_since(modified) {
            Ok(age) => age <= self.options.recency_window,
            Err(_) => true,
        }
    }

    /// Number of records folded so far that carried an error.
    pub fn error_count(&self) -> u64 {
        self.errors.len() as u64
    }

    pub fn finish(self) -> StatsSummary {
        let extension_sizes = into_sorted_map(self.extension_size);
        let extension_counts = into_sorted_map(self.extension_count);
        let top_n = self.options.top_n;
        let categories =
            analyse_categories(&extension_sizes, &extension_counts, &self.options.categories);

        StatsSummary {
            root: self.root,
            scanned_at: DateTime::<Utc>::from(self.scan_time),
            file_count: self.file_count,
            dir_count: self.dir_count,
            symlink_count: self.symlink_count,
            total_size_bytes: self.total_size_bytes,
            largest_file: self.largest_file,
            top_extensions_by_size: top_extensions(&extension_sizes, top_n),
            top_extensions_by_count: top_extensions(&extension_counts, top_n),
            extension_sizes,
            extension_counts,
            categories,
            oldest_modified: self.oldest.map(DateTime::<Utc>::from),
            newest_modified: self.newest.map(DateTime::<Utc>::from),
            recent_file_count: self.recent_file_count,
            recency_window_days: self.options.recency_window.as_secs() / SECS_PER_DAY,
            hidden_dir_count: self.hidden_dir_count,
            hidden_file_count: self.hidden_file_count,
            empty_dir_count: self.empty_dir_count,
            zero_byte_file_count: self.zero_byte_file_count,
            error_count: self.errors.len() as u64,
            errors: self.errors,
        }
    }
}

fn into_sorted_map(map: HashMap<CompactString, u64>) -> BTreeMap<String, u64> {
    map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// The `n` largest totals, descending, ties broken by extension ascending.
///
/// Each pair is decorated once with its sort key `(Reverse(total), ext)`.
/// Extensions are unique, so the key is a total order and an unstable sort
/// is deterministic. When `n` is much smaller than the map, a partial
/// selection brings the top `n` to the front before only those are sorted.
pub fn top_extensions(totals: &BTreeMap<String, u64>, n: usize) -> Vec<ExtensionTotal> {
    // Guard: `n - 1` below must not underflow.
    if n == 0 {
        return Vec::new();
    }

    let mut decorated: Vec<(Reverse<u64>, &str)> = totals
        .iter()
        .map(|(ext, &total)| (Reverse(total), ext.as_str()))
        .collect();

    if decorated.len() > n {
        decorated.select_nth_unstable(n - 1);
        decorated.truncate(n);
    }
    decorated.sort_unstable();

    decorated
        .into_iter()
        .map(|(Reverse(total), ext)| ExtensionTotal {
            extension: ext.to_string(),
            total,
        })
        .collect()
}

/// Fold a complete record stream.
pub fn aggregate<I>(
    records: I,
    root: impl Into<PathBuf>,
    options: &ScanOptions,
    scan_time: SystemTime,
) -> StatsSummary
where
    I: IntoIterator<Item = EntryRecord>,
{
    let mut aggregator = Aggregator::new(root, options, scan_time);
    for record in records {
        aggregator.fold(record);
    }
    aggregator.finish()
}
