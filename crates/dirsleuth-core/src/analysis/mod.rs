/// Analysis modules: folding scan records into statistics.

pub mod aggregate;
pub mod file_types;

pub use aggregate::{aggregate, top_extensions, Aggregator};
pub use file_types::{analyse_categories, CategoryStats, CategoryTable, FileCategory};
