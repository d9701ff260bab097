/// Presenters for a finished [`StatsSummary`].
///
/// Each takes the summary by reference and performs no filesystem access,
/// so any of them can be swapped without touching the scanner.
///
/// - [`render_text`]: indented human-readable block, optional ANSI colour.
/// - [`render_json`]: the whole summary as pretty-printed JSON.
/// - [`write_extensions_csv`]: one CSV row per extension.
pub mod text;

pub use text::{extension_label, render_text, TextStyle};

use crate::analysis::file_types::CategoryTable;
use crate::model::StatsSummary;
use serde::Serialize;
use std::io;

pub fn render_json(summary: &StatsSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

#[derive(Debug, Serialize)]
struct ExtensionRow<'a> {
    extension: &'a str,
    category: &'static str,
    file_count: u64,
    total_size_bytes: u64,
}

/// Write the per-extension composition as CSV, largest total size first.
///
/// Files without an extension appear as `<none>`. Categories come from
/// `table`, normally the one the scan used.
pub fn write_extensions_csv<W: io::Write>(
    summary: &StatsSummary,
    table: &CategoryTable,
    writer: W,
) -> csv::Result<()> {
    let mut rows: Vec<ExtensionRow<'_>> = summary
        .extension_counts
        .iter()
        .map(|(ext, &file_count)| ExtensionRow {
            extension: extension_label(ext),
            category: table.categorise(ext).label(),
            file_count,
            total_size_bytes: summary.extension_sizes.get(ext).copied().unwrap_or(0),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_size_bytes
            .cmp(&a.total_size_bytes)
            .then_with(|| a.extension.cmp(b.extension))
    });

    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
