/// Data model for DirSleuth scans.
///
/// Re-exports the per-entry record, the statistics summary, and the
/// display helpers for sizes and counts.
pub mod entry;
pub mod size;
pub mod summary;

pub use entry::{EntryError, EntryKind, EntryRecord, ErrorKind};
pub use summary::{EntryFailure, ExtensionTotal, LargestFile, StatsSummary};
