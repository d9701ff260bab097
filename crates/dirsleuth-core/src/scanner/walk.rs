/// Single-threaded, depth-first walker producing one [`EntryRecord`] per
/// visited entry, built on `jwalk` in serial mode.
///
/// # Ordering
///
/// Children of every directory are visited in name order, so two walks over
/// an unchanged tree yield identical record sequences. `jwalk` yields
/// entries pre-order; the walker keeps the directories it is inside on a
/// stack and emits each one only once a later entry shows it has closed
/// (post-order). That is the first point at which its emptiness is known.
/// The scan root is always the final record.
///
/// # Symlinked directories
///
/// When symlinks are followed, every directory listing passes through
/// [`guard_links`] before `jwalk` descends into it. A link whose resolved
/// target is one of the directories currently open (or contains one) is a
/// cycle: it becomes a `CycleDetected` error and is not descended. A link
/// to another directory inside the root is not descended either, since the
/// walk reaches that directory by its real path. Only links leading out of
/// the root are followed.
use crate::error::{Result, RootProblem, ScanError};
use crate::model::entry::{extension_of, is_hidden_name};
use crate::model::{EntryError, EntryKind, EntryRecord, ErrorKind};
use jwalk::{DirEntry, Parallelism, WalkDirGeneric};
use std::collections::VecDeque;
use std::fs::{self, FileType, Metadata};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Canonical paths of the directories enclosing a listing, outermost first.
/// `jwalk` clones it from each directory into its children.
#[derive(Debug, Clone, Default)]
struct Ancestors(Vec<PathBuf>);

/// What [`guard_links`] decided about a followed directory link.
#[derive(Debug, Clone, Default)]
enum LinkState {
    /// Not a link, or a link that is descended normally.
    #[default]
    Descend,
    /// Resolves to an enclosing directory.
    Cycle(PathBuf),
    /// Resolves to a directory inside the root, which is walked directly.
    Alias(PathBuf),
    /// The target could not be resolved.
    Unresolved(ErrorKind, String),
}

type WalkState = (Ancestors, LinkState);
type JwalkItem = std::result::Result<DirEntry<WalkState>, jwalk::Error>;

/// A directory whose children are still being yielded.
struct OpenDir {
    depth: usize,
    /// Emitted when the directory closes. `is_empty_dir` is filled in then.
    record: EntryRecord,
    child_count: u64,
}

/// Lazy, non-restartable traversal of a directory tree.
pub struct Walk {
    entries: Box<dyn Iterator<Item = JwalkItem>>,
    follow_symlinks: bool,
    /// The root as given by the caller, and the resolved path `jwalk` walks.
    root: PathBuf,
    walk_root: PathBuf,
    open: Vec<OpenDir>,
    ready: VecDeque<EntryRecord>,
}

impl Walk {
    /// Validate `root` and prepare a walk over it.
    ///
    /// The root is resolved through symlinks. It must exist and be a
    /// directory; otherwise `ScanError::InvalidRoot` is returned and nothing
    /// is traversed. Record paths are reported under `root` as given.
    pub fn new(root: &Path, follow_symlinks: bool) -> Result<Self> {
        let meta = fs::metadata(root).map_err(|err| ScanError::from_root_io(root, err))?;
        if !meta.is_dir() {
            return Err(ScanError::invalid_root(root, RootProblem::NotADirectory));
        }
        let walk_root = fs::canonicalize(root).map_err(|err| ScanError::from_root_io(root, err))?;

        let mut walker = WalkDirGeneric::<WalkState>::new(&walk_root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(follow_symlinks)
            .parallelism(Parallelism::Serial);
        if follow_symlinks {
            let inside = walk_root.clone();
            walker = walker.process_read_dir(move |_depth, dir, ancestors, children| {
                guard_links(&inside, dir, ancestors, children)
            });
        }

        Ok(Self {
            entries: Box::new(walker.into_iter()),
            follow_symlinks,
            root: root.to_path_buf(),
            walk_root,
            open: Vec::new(),
            ready: VecDeque::new(),
        })
    }

    /// Report `path` under the caller's root instead of the resolved one.
    fn rebase(&self, path: PathBuf) -> PathBuf {
        match path.strip_prefix(&self.walk_root) {
            Ok(rel) if rel.as_os_str().is_empty() => self.root.clone(),
            Ok(rel) => self.root.join(rel),
            Err(_) => path,
        }
    }

    /// Emit every open directory at `depth` or deeper.
    fn close_to(&mut self, depth: usize) {
        while self.open.last().is_some_and(|dir| dir.depth >= depth) {
            if let Some(OpenDir {
                mut record,
                child_count,
                ..
            }) = self.open.pop()
            {
                if record.kind == EntryKind::Directory {
                    record.is_empty_dir = child_count == 0;
                }
                self.ready.push_back(record);
            }
        }
    }

    /// Account for a new entry at `depth` in its still-open parent.
    fn enter(&mut self, depth: usize) {
        self.close_to(depth);
        if let Some(parent) = self.open.last_mut() {
            parent.child_count += 1;
        }
    }

    fn accept(&mut self, item: JwalkItem) {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                self.enter(err.depth());
                let record = self.failed_entry(&err);
                self.ready.push_back(record);
                return;
            }
        };

        let depth = entry.depth();
        self.enter(depth);
        let path = self.rebase(entry.path());
        let descended = entry.read_children_path.is_some();

        let mut record = if depth == 0 {
            self.root_record(path)
        } else {
            self.classify(path, &entry)
        };
        if record.error.is_none() {
            if let Some(err) = &entry.read_children_error {
                debug!("Cannot list {}: {err}", record.path.display());
                record.error = Some(error_of(err));
            }
        }

        if descended && record.error.is_none() {
            self.open.push(OpenDir {
                depth,
                record,
                child_count: 0,
            });
        } else {
            self.ready.push_back(record);
        }
    }

    fn root_record(&self, path: PathBuf) -> EntryRecord {
        let mut record = EntryRecord::new(path, EntryKind::Directory);
        record.modified_at = fs::metadata(&self.walk_root).ok().and_then(|m| m.modified().ok());
        record
    }

    /// Build the record for a non-root entry.
    fn classify(&self, path: PathBuf, entry: &DirEntry<WalkState>) -> EntryRecord {
        let is_link = entry.path_is_symlink();
        let file_type = entry.file_type();

        if is_link && !self.follow_symlinks {
            let mut record = EntryRecord::new(path, EntryKind::Symlink);
            record.modified_at = fs::symlink_metadata(entry.path())
                .ok()
                .and_then(|m| m.modified().ok());
            return record;
        }

        if is_link {
            return self.followed_link(path, entry);
        }

        let meta = match fs::symlink_metadata(entry.path()) {
            Ok(meta) => meta,
            Err(err) => {
                debug!("Cannot stat {}: {err}", path.display());
                return EntryRecord::failed(path, EntryKind::Unknown, EntryError::from_io(&err));
            }
        };

        if file_type.is_file() {
            file_record(path, EntryKind::File, &meta)
        } else if file_type.is_dir() {
            let mut record = EntryRecord::new(path, EntryKind::Directory);
            record.modified_at = meta.modified().ok();
            record.is_hidden = is_hidden_name(&record.path);
            record
        } else {
            unsupported(path, file_type)
        }
    }

    /// A symlink reached with following enabled. `jwalk` reports the
    /// target's file type.
    fn followed_link(&self, path: PathBuf, entry: &DirEntry<WalkState>) -> EntryRecord {
        let target = match fs::metadata(entry.path()) {
            Ok(meta) => meta,
            Err(err) => {
                debug!("Dangling symlink {}: {err}", path.display());
                return EntryRecord::failed(path, EntryKind::Symlink, EntryError::from_io(&err));
            }
        };

        if target.is_file() {
            let mut record = file_record(path, EntryKind::Symlink, &target);
            record.target_kind = Some(EntryKind::File);
            return record;
        }

        let mut record = EntryRecord::new(path, EntryKind::Symlink);
        record.modified_at = target.modified().ok();
        if !target.is_dir() {
            record.target_kind = Some(EntryKind::Unknown);
            return record;
        }

        record.target_kind = Some(EntryKind::Directory);
        match &entry.client_state {
            LinkState::Descend => {}
            LinkState::Alias(target) => {
                debug!(
                    "Not descending {}: {} is inside the root",
                    record.path.display(),
                    target.display()
                );
            }
            LinkState::Cycle(target) => {
                debug!(
                    "Not descending {}: {} encloses it",
                    record.path.display(),
                    target.display()
                );
                record.error = Some(EntryError::new(
                    ErrorKind::CycleDetected,
                    format!("{} is an enclosing directory", target.display()),
                ));
            }
            LinkState::Unresolved(kind, message) => {
                record.error = Some(EntryError::new(*kind, message.clone()));
            }
        }
        record
    }

    /// Record for an entry `jwalk` could not read at all.
    fn failed_entry(&self, err: &jwalk::Error) -> EntryRecord {
        let error = error_of(err);
        let Some(raw) = err.path() else {
            return EntryRecord::failed(self.root.clone(), EntryKind::Unknown, error);
        };
        debug!("Cannot read {}: {err}", raw.display());
        let kind = match fs::symlink_metadata(raw) {
            Ok(meta) if meta.file_type().is_symlink() => EntryKind::Symlink,
            _ => EntryKind::Unknown,
        };
        EntryRecord::failed(self.rebase(raw.to_path_buf()), kind, error)
    }
}

impl Iterator for Walk {
    type Item = EntryRecord;

    fn next(&mut self) -> Option<EntryRecord> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Some(record);
            }
            match self.entries.next() {
                Some(item) => self.accept(item),
                None if self.open.is_empty() => return None,
                None => self.close_to(0),
            }
        }
    }
}

/// Decide, for each followed directory link in a listing, whether `jwalk`
/// may descend into it. Runs before the listing's children are yielded.
fn guard_links(
    root: &Path,
    dir: &Path,
    ancestors: &mut Ancestors,
    children: &mut [JwalkItem],
) {
    let here = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    ancestors.0.push(here);

    for child in children.iter_mut().flatten() {
        if !(child.path_is_symlink() && child.file_type().is_dir()) {
            continue;
        }
        let state = match fs::canonicalize(child.path()) {
            Ok(target) if ancestors.0.iter().any(|open| open.starts_with(&target)) => {
                LinkState::Cycle(target)
            }
            Ok(target) if target.starts_with(root) => LinkState::Alias(target),
            Ok(_) => continue,
            Err(err) => LinkState::Unresolved(ErrorKind::from_io(&err), err.to_string()),
        };
        child.read_children_path = None;
        child.client_state = state;
    }
}

fn error_of(err: &jwalk::Error) -> EntryError {
    match err.io_error() {
        Some(io) => EntryError::from_io(io),
        None => EntryError::new(ErrorKind::Other, err.to_string()),
    }
}

fn file_record(path: PathBuf, kind: EntryKind, meta: &Metadata) -> EntryRecord {
    let mut record = EntryRecord::new(path, kind);
    record.size_bytes = meta.len();
    record.modified_at = meta.modified().ok();
    record.extension = extension_of(&record.path);
    record
}

fn unsupported(path: PathBuf, file_type: FileType) -> EntryRecord {
    debug!("Unsupported entry type {file_type:?} at {}", path.display());
    EntryRecord::failed(
        path,
        EntryKind::Unknown,
        EntryError::new(ErrorKind::Unsupported, "unsupported entry type"),
    )
}
