/// Scanner module: walks a directory tree and folds it into statistics.
///
/// - [`walk`]: the lazy, single-threaded depth-first walker over `jwalk`.
///
/// [`scan`] is the usual entry point: it validates the root, walks it once,
/// and hands every record straight to the aggregator. Nothing from a scan
/// is retained between calls.
pub mod walk;

use crate::analysis::aggregate::Aggregator;
use crate::analysis::file_types::CategoryTable;
use crate::error::Result;
use crate::model::StatsSummary;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

pub use walk::Walk;

/// Number of extensions kept in each top-N ranking by default.
pub const DEFAULT_TOP_N: usize = 3;

/// Files modified within this many days of the scan count as recent.
pub const DEFAULT_RECENCY_DAYS: u64 = 30;

/// Records between progress log lines.
const PROGRESS_INTERVAL: u64 = 5_000;

/// Knobs for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Follow symlinks into their targets. Off by default.
    pub follow_symlinks: bool,
    pub top_n: usize,
    pub recency_window: Duration,
    pub categories: CategoryTable,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            top_n: DEFAULT_TOP_N,
            recency_window: Duration::from_secs(DEFAULT_RECENCY_DAYS * 86_400),
            categories: CategoryTable::default(),
        }
    }
}

impl ScanOptions {
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_recency_days(mut self, days: u64) -> Self {
        self.recency_window = Duration::from_secs(days.saturating_mul(86_400));
        self
    }

    pub fn with_categories(mut self, table: CategoryTable) -> Self {
        self.categories = table;
        self
    }
}

/// Start a lazy walk over `root` on the host filesystem.
pub fn walk(root: &Path, follow_symlinks: bool) -> Result<Walk> {
    Walk::new(root, follow_symlinks)
}

/// Scan `root` on the host filesystem and return its statistics.
///
/// Fails only if the root does not exist or is not a directory. Every
/// per-entry problem below the root is reported inside the summary.
pub fn scan(root: impl AsRef<Path>, options: &ScanOptions) -> Result<StatsSummary> {
    let root = root.as_ref();
    // Captured before the walk so the recency window does not drift with
    // scan duration.
    let scan_time = SystemTime::now();
    let walker = Walk::new(root, options.follow_symlinks)?;

    info!(
        "Starting scan of {} (follow_symlinks={})",
        root.display(),
        options.follow_symlinks
    );
    let start = Instant::now();

    let mut aggregator = Aggregator::new(root, options, scan_time);
    let mut visited: u64 = 0;
    for record in walker {
        aggregator.fold(record);
        visited += 1;
        if visited % PROGRESS_INTERVAL == 0 {
            debug!(
                "Scanned {visited} entries, {} errors so far",
                aggregator.error_count()
            );
        }
    }

    let summary = aggregator.finish();
    info!(
        "Scan complete: {} files, {} dirs, {} symlinks, {} errors in {:?}",
        summary.file_count,
        summary.dir_count,
        summary.symlink_count,
        summary.error_count,
        start.elapsed()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(path: &Path, n: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; n]).unwrap();
    }

    #[test]
    fn scan_folds_the_whole_tree() {
        let tmp = TempDir::new().unwrap();
        let r = tmp.path();
        write(&r.join("a.txt"), 10);
        fs::create_dir(r.join("sub")).unwrap();
        write(&r.join("sub").join("b.txt"), 20);
        write(&r.join("sub").join("c.rs"), 30);
        fs::create_dir(r.join("empty")).unwrap();

        let s = scan(r, &ScanOptions::default()).unwrap();
        assert_eq!(s.total_size_bytes, 60);
        assert_eq!(s.file_count, 3);
        assert_eq!(s.dir_count, 3);
        assert_eq!(s.empty_dir_count, 1);
        assert_eq!(s.extension_sizes.get(".txt"), Some(&30));
        assert_eq!(s.largest_file.map(|l| l.size), Some(30));
    }

    #[cfg(unix)]
    #[test]
    fn denied_directory_increments_error_count_by_one() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("a.bin"), 8);
        let before = scan(tmp.path(), &ScanOptions::default()).unwrap();

        let private = tmp.path().join(".private");
        fs::create_dir(&private).unwrap();
        write(&private.join("huge.bin"), 9_999);
        fs::set_permissions(&private, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&private).is_ok() {
            // Running as root: permissions are not enforced.
            fs::set_permissions(&private, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let after = scan(tmp.path(), &ScanOptions::default()).unwrap();
        fs::set_permissions(&private, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(after.error_count, before.error_count + 1);
        assert_eq!(after.errors.len(), 1);
        assert_eq!(after.errors[0].kind, ErrorKind::PermissionDenied);
        assert_eq!(after.total_size_bytes, before.total_size_bytes);
        assert_eq!(after.extension_sizes, before.extension_sizes);
        assert_eq!(after.dir_count, before.dir_count + 1);
        assert_eq!(after.hidden_dir_count, 1, "name alone makes it hidden");
    }

    #[cfg(unix)]
    #[test]
    fn cycle_terminates_and_is_reported() {
        let tmp = TempDir::new().unwrap();
        let b = tmp.path().join("a").join("b");
        fs::create_dir_all(&b).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("a"), b.join("up")).unwrap();

        let options = ScanOptions::default().with_follow_symlinks(true);
        let s = scan(tmp.path(), &options).unwrap();
        assert_eq!(s.error_count, 1);
        assert_eq!(s.errors[0].kind, ErrorKind::CycleDetected);
        assert_eq!(s.symlink_count, 1);
        assert_eq!(s.classified_count(), 4);
    }

    #[test]
    fn options_builders_set_fields() {
        let o = ScanOptions::default()
            .with_follow_symlinks(true)
            .with_top_n(7)
            .with_recency_days(2);
        assert!(o.follow_symlinks);
        assert_eq!(o.top_n, 7);
        assert_eq!(o.recency_window, Duration::from_secs(2 * 86_400));
    }

    #[test]
    fn huge_recency_window_saturates() {
        let o = ScanOptions::default().with_recency_days(u64::MAX);
        assert_eq!(o.recency_window, Duration::from_secs(u64::MAX));
    }
}
