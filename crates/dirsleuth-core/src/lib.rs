/// DirSleuth Core: directory scanning, statistics, and reporting.
///
/// This crate contains all business logic with no terminal dependencies.
/// The `dirsleuth` binary is a thin front end over it.
///
/// # Modules
///
/// - [`model`]: Per-entry records, the statistics summary, size formatting.
/// - [`scanner`]: Single-pass directory walk and the `scan` entry point.
/// - [`analysis`]: The record fold, top-N rankings, extension categories.
/// - [`report`]: Text, JSON and CSV presenters for a finished summary.
/// - [`listing`]: Base-directory handle with sorted listings.
/// - [`error`]: Errors that abort a scan before it starts.
pub mod analysis;
pub mod error;
pub mod listing;
pub mod model;
pub mod report;
pub mod scanner;

pub use error::{RootProblem, ScanError};
pub use listing::{BaseDir, SortBy};
pub use model::StatsSummary;
pub use scanner::{scan, ScanOptions};
