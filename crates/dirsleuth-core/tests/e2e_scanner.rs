/// End-to-end scanner integration tests.
///
/// These tests run the real `scan` entry point against real temporary
/// directory trees, so every call goes through the host filesystem:
/// listing, `lstat`, canonicalisation and the final fold.
use dirsleuth_core::model::{EntryKind, ErrorKind, StatsSummary};
use dirsleuth_core::scanner::{self, ScanOptions};
use dirsleuth_core::{scan, RootProblem, ScanError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Create a reproducible directory tree for scanner tests:
///
/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///   beta/
///     c.png   (300 bytes)
///   .cache/
///   d.zip     (400 bytes)
/// ```
///
/// Total file bytes: 1 000.
fn build_test_tree(root: &Path) {
    let alpha = root.join("alpha");
    let beta = root.join("beta");
    fs::create_dir_all(&alpha).unwrap();
    fs::create_dir_all(&beta).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();

    write_bytes(&alpha.join("a.txt"), 100);
    write_bytes(&alpha.join("b.rs"), 200);
    write_bytes(&beta.join("c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// The summary with scan-time dependent fields cleared.
fn time_independent(mut s: StatsSummary) -> StatsSummary {
    s.scanned_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
    s.recent_file_count = 0;
    s
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn scan_discovers_all_files() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let s = scan(tmp.path(), &ScanOptions::default()).expect("scan failed");

    assert_eq!(s.file_count, 4);
    assert_eq!(s.dir_count, 4, "root, alpha, beta, .cache");
    assert_eq!(s.symlink_count, 0);
    assert_eq!(s.total_size_bytes, 1_000);
    assert_eq!(s.hidden_dir_count, 1);
    assert_eq!(s.hidden_file_count, 0);
    assert_eq!(s.empty_dir_count, 1, ".cache is empty");
    assert_eq!(s.error_count, 0);
    assert_eq!(s.recent_file_count, 4, "all files were just written");

    let largest = s.largest_file.expect("largest file");
    assert_eq!(largest.size, 400);
    assert!(largest.path.ends_with("d.zip"));
}

#[test]
fn hidden_files_are_counted() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_bytes(&tmp.path().join(".env"), 3);
    write_bytes(&tmp.path().join("visible.txt"), 3);

    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
    assert_eq!(s.hidden_file_count, 1);
    assert_eq!(s.hidden_dir_count, 0);
}

#[test]
fn scan_sizes_are_exact() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_bytes(&tmp.path().join("x.bin"), 10);
    write_bytes(&tmp.path().join("y.bin"), 20);
    write_bytes(&tmp.path().join("z.bin"), 30);

    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
    assert_eq!(s.total_size_bytes, 60);
    assert_eq!(s.extension_sizes.get(".bin"), Some(&60));
    assert_eq!(s.extension_counts.get(".bin"), Some(&3));
}

#[test]
fn scan_top_extensions_by_size() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
    let by_size: Vec<(&str, u64)> = s
        .top_extensions_by_size
        .iter()
        .map(|t| (t.extension.as_str(), t.total))
        .collect();
    assert_eq!(by_size, vec![(".zip", 400), (".png", 300), (".rs", 200)]);
}

/// Scans of an empty directory succeed with the root as the only entry.
#[test]
fn scan_empty_directory() {
    let tmp = TempDir::new().expect("failed to create temp dir");

    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
    assert_eq!(s.classified_count(), 1);
    assert_eq!(s.dir_count, 1);
    assert_eq!(s.empty_dir_count, 1);
    assert_eq!(s.total_size_bytes, 0);
    assert!(s.largest_file.is_none());
    assert_eq!(s.hidden_dir_count, 0, "the root is never hidden");
}

#[test]
fn nested_empty_directories_only_innermost_is_empty() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir_all(tmp.path().join("outer").join("inner")).unwrap();

    let records: Vec<_> = scanner::walk(tmp.path(), false).unwrap().collect();
    let outer = records.iter().find(|r| r.path.ends_with("outer")).unwrap();
    let inner = records.iter().find(|r| r.path.ends_with("inner")).unwrap();
    assert!(inner.is_empty_dir);
    assert!(!outer.is_empty_dir);

    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
    assert_eq!(s.empty_dir_count, 1);
}

/// Two scans of an unchanged tree agree on everything but scan time.
#[test]
fn scan_is_idempotent() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    write_bytes(&tmp.path().join("alpha").join("tie.dat"), 400);

    let first = time_independent(scan(tmp.path(), &ScanOptions::default()).unwrap());
    let second = time_independent(scan(tmp.path(), &ScanOptions::default()).unwrap());
    assert_eq!(first, second);

    // alpha/ is walked before d.zip, so its 400-byte file wins the tie.
    let largest = first.largest_file.unwrap();
    assert!(largest.path.ends_with("tie.dat"));
}

#[test]
fn walk_classification_is_disjoint() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let records: Vec<_> = scanner::walk(tmp.path(), false).unwrap().collect();
    let s = scan(tmp.path(), &ScanOptions::default()).unwrap();

    let classified = records
        .iter()
        .filter(|r| r.kind != EntryKind::Unknown)
        .count() as u64;
    assert_eq!(s.classified_count(), classified);
    assert_eq!(records.len(), 8);
    assert!(records.last().unwrap().path == tmp.path(), "root comes last");
}

#[test]
fn missing_root_is_invalid() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let err = scan(tmp.path().join("does-not-exist"), &ScanOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ScanError::InvalidRoot {
            reason: RootProblem::NotFound,
            ..
        }
    ));
}

#[test]
fn file_root_is_invalid() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let file = tmp.path().join("plain.txt");
    write_bytes(&file, 5);

    let err = scan(&file, &ScanOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ScanError::InvalidRoot {
            reason: RootProblem::NotADirectory,
            ..
        }
    ));
    assert!(err.to_string().contains("is not a directory"));
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn unfollowed_symlinks_are_counted_not_sized() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        build_test_tree(tmp.path());
        symlink(tmp.path().join("d.zip"), tmp.path().join("link.zip")).unwrap();

        let s = scan(tmp.path(), &ScanOptions::default()).unwrap();
        assert_eq!(s.symlink_count, 1);
        assert_eq!(s.file_count, 4);
        assert_eq!(s.total_size_bytes, 1_000);
    }

    #[test]
    fn followed_symlink_to_file_adds_target_size() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        build_test_tree(tmp.path());
        symlink(tmp.path().join("d.zip"), tmp.path().join("link.zip")).unwrap();

        let options = ScanOptions::default().with_follow_symlinks(true);
        let s = scan(tmp.path(), &options).unwrap();
        assert_eq!(s.symlink_count, 1);
        assert_eq!(s.total_size_bytes, 1_400);
        assert_eq!(s.extension_sizes.get(".zip"), Some(&400));
    }

    /// A symlink pointing at an ancestor must not make the walk recurse
    /// forever; it is reported once as a cycle.
    #[test]
    fn symlink_cycle_terminates() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        build_test_tree(tmp.path());
        symlink(tmp.path(), tmp.path().join("alpha").join("back-to-root")).unwrap();

        let options = ScanOptions::default().with_follow_symlinks(true);
        let s = scan(tmp.path(), &options).unwrap();

        assert_eq!(s.error_count, 1);
        assert_eq!(s.errors[0].kind, ErrorKind::CycleDetected);
        assert!(s.errors[0].path.ends_with("back-to-root"));
        assert_eq!(s.total_size_bytes, 1_000);
    }

    /// A link inside the root that sorts before its target only aliases
    /// it: the real directory keeps its counts and nothing is an error.
    #[test]
    fn alias_link_inside_root_is_not_a_cycle() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let target = tmp.path().join("zeta");
        fs::create_dir(&target).unwrap();
        fs::create_dir(target.join(".hidden-empty")).unwrap();
        write_bytes(&target.join("f.txt"), 7);
        symlink(&target, tmp.path().join("a_link")).unwrap();

        let options = ScanOptions::default().with_follow_symlinks(true);
        let s = scan(tmp.path(), &options).unwrap();

        assert_eq!(s.error_count, 0, "errors: {:?}", s.errors);
        assert_eq!(s.dir_count, 3, "root, zeta, .hidden-empty");
        assert_eq!(s.hidden_dir_count, 1);
        assert_eq!(s.empty_dir_count, 1);
        assert_eq!(s.symlink_count, 1);
        assert_eq!(s.file_count, 1);
        assert_eq!(s.total_size_bytes, 7);
    }

    #[test]
    fn dangling_symlink_is_an_error_only_when_followed() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        symlink(tmp.path().join("nowhere"), tmp.path().join("broken")).unwrap();

        let plain = scan(tmp.path(), &ScanOptions::default()).unwrap();
        assert_eq!(plain.error_count, 0);
        assert_eq!(plain.symlink_count, 1);

        let followed = scan(tmp.path(), &ScanOptions::default().with_follow_symlinks(true)).unwrap();
        assert_eq!(followed.error_count, 1);
        assert_eq!(followed.errors[0].kind, ErrorKind::NotFound);
        assert_eq!(followed.symlink_count, 1);
    }
}
