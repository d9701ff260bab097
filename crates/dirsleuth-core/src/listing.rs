/// A validated base directory and the operations rooted at it.
///
/// Relative paths passed to [`BaseDir`] methods resolve against the base.
/// The directory listing sorts with a decorate-sort-undecorate pass: each
/// child is stat'ed exactly once to build its key, the decorated pairs are
/// sorted, and the keys are dropped.
use crate::error::{Result, RootProblem, ScanError};
use crate::model::StatsSummary;
use crate::report::{render_text, TextStyle};
use crate::scanner::{self, ScanOptions};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Sort order for [`BaseDir::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Case-insensitive file name.
    Name,
    /// Modification time, oldest first.
    Mtime,
    /// Size in bytes, smallest first. Directories sort as 0.
    Size,
}

/// Sort key computed once per entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Name(String),
    Mtime(SystemTime),
    Size(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseDir {
    root: PathBuf,
}

impl BaseDir {
    /// Fails with `InvalidRoot` when `root` does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::metadata(&root).map_err(|err| ScanError::from_root_io(&root, err))?;
        Ok(Self { root })
    }

    /// The current working directory.
    pub fn current() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| ScanError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Self::new(cwd)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute paths pass through; relative ones join the base.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Immediate children of `path`, optionally sorted.
    ///
    /// The sort is stable, so entries with equal keys keep their listing
    /// order in both directions. With `relative`, paths under the base are
    /// returned relative to it.
    pub fn scan(
        &self,
        path: impl AsRef<Path>,
        sort_by: Option<SortBy>,
        reverse: bool,
        relative: bool,
    ) -> Result<Vec<PathBuf>> {
        let dir = self.resolve(path);
        let meta = fs::metadata(&dir).map_err(|err| ScanError::from_root_io(&dir, err))?;
        if !meta.is_dir() {
            return Err(ScanError::invalid_root(dir, RootProblem::NotADirectory));
        }

        let entries = fs::read_dir(&dir).map_err(|source| ScanError::Io {
            path: dir.clone(),
            source,
        })?;
        let children = readable(&dir, entries.map(|e| e.map(|e| e.path())));

        let ordered = match sort_by {
            None => children,
            Some(sort_by) => {
                // Decorate.
                let mut decorated = children
                    .into_iter()
                    .map(|p| Ok((sort_key(&p, sort_by)?, p)))
                    .collect::<Result<Vec<(SortKey, PathBuf)>>>()?;
                // Sort.
                decorated.sort_by(|a, b| {
                    let order = a.0.cmp(&b.0);
                    if reverse {
                        order.reverse()
                    } else {
                        order
                    }
                });
                // Undecorate.
                decorated.into_iter().map(|(_, p)| p).collect()
            }
        };

        Ok(ordered
            .into_iter()
            .map(|p| if relative { self.relativise(p) } else { p })
            .collect())
    }

    fn relativise(&self, path: PathBuf) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path,
        }
    }

    /// Scan the whole base directory.
    pub fn stats(&self, options: &ScanOptions) -> Result<StatsSummary> {
        scanner::scan(&self.root, options)
    }

    /// Scan the base directory and render the summary as text.
    pub fn display_stats(&self, options: &ScanOptions, style: &TextStyle) -> Result<String> {
        Ok(render_text(&self.stats(options)?, style))
    }
}

/// Keep every child that could be read. A failed entry is logged and
/// skipped so the rest of the listing survives.
fn readable<I>(dir: &Path, entries: I) -> Vec<PathBuf>
where
    I: Iterator<Item = io::Result<PathBuf>>,
{
    entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                debug!("Skipping unreadable entry in {}: {err}", dir.display());
                None
            }
        })
        .collect()
}

fn sort_key(path: &Path, sort_by: SortBy) -> Result<SortKey> {
    let io_err = |source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };
    Ok(match sort_by {
        SortBy::Name => SortKey::Name(
            path.file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
        ),
        SortBy::Mtime => SortKey::Mtime(fs::metadata(path).and_then(|m| m.modified()).map_err(io_err)?),
        SortBy::Size => {
            let meta = fs::metadata(path).map_err(io_err)?;
            SortKey::Size(if meta.is_file() { meta.len() } else { 0 })
        }
    })
}

impl PartialOrd for BaseDir {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BaseDir {
    fn cmp(&self, other: &Self) -> Ordering {
        self.root.cmp(&other.root)
    }
}

impl std::fmt::Display for BaseDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BaseDir({})", self.root.display())
    }
}
