/// Human-readable rendering of a [`StatsSummary`].
use crate::model::size::{format_count, format_size};
use crate::model::{ExtensionTotal, StatsSummary};
use std::fmt::Write;

/// Error lines listed before the rest are summarised.
const MAX_LISTED_ERRORS: usize = 10;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Output styling for [`render_text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub color: bool,
}

impl TextStyle {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    fn paint(&self, code: &str, text: impl std::fmt::Display) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Label used for files with no extension.
pub fn extension_label(ext: &str) -> &str {
    if ext.is_empty() {
        "<none>"
    } else {
        ext
    }
}

fn extensions_line(items: &[ExtensionTotal], as_size: bool, style: &TextStyle) -> String {
    if items.is_empty() {
        return style.paint(DIM, "-");
    }
    items
        .iter()
        .map(|item| {
            let value = if as_size {
                format_size(item.total)
            } else {
                format_count(item.total)
            };
            format!(
                "{} {}",
                style.paint(BOLD, format!("{:<7}", extension_label(&item.extension))),
                style.paint(DIM, format!("{value:<8}"))
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// Render `summary` as an indented block of labelled lines.
pub fn render_text(summary: &StatsSummary, style: &TextStyle) -> String {
    let s = summary;
    let mut out = String::new();
    let indent = "  ";

    let largest = match &s.largest_file {
        Some(file) => {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.path.display().to_string());
            format!(
                "{} {}",
                style.paint(BOLD, name),
                style.paint(DIM, format!("({})", format_size(file.size)))
            )
        }
        None => style.paint(DIM, "-"),
    };

    let recent_color = if s.recent_file_count > 0 { GREEN } else { DIM };
    let error_color = if s.error_count == 0 { GREEN } else { RED };

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", style.paint(BLUE, s.root.display()));
    let _ = writeln!(
        out,
        "{indent}{}      {} {}",
        style.paint(CYAN, "Files:"),
        style.paint(BOLD, format_count(s.file_count)),
        style.paint(DIM, format!("(hidden: {})", format_count(s.hidden_file_count)))
    );
    let _ = writeln!(
        out,
        "{indent}{} {} {}",
        style.paint(CYAN, "Directories:"),
        style.paint(BOLD, format_count(s.dir_count)),
        style.paint(DIM, format!("(hidden: {})", format_count(s.hidden_dir_count)))
    );
    let _ = writeln!(
        out,
        "{indent}{}    {}",
        style.paint(CYAN, "Symlinks:"),
        style.paint(BOLD, format_count(s.symlink_count))
    );
    let _ = writeln!(
        out,
        "{indent}{}  {}",
        style.paint(GREEN, "Total size:"),
        style.paint(BOLD, format_size(s.total_size_bytes))
    );
    let _ = writeln!(out, "{indent}{} {largest}", style.paint(GREEN, "Largest file:"));
    let _ = writeln!(out, "{indent}{}", style.paint(CYAN, "Top extensions:"));
    let _ = writeln!(
        out,
        "{indent}  By size  : {}",
        extensions_line(&s.top_extensions_by_size, true, style)
    );
    let _ = writeln!(
        out,
        "{indent}  By count : {}",
        extensions_line(&s.top_extensions_by_count, false, style)
    );

    if !s.categories.is_empty() {
        let cats = s
            .categories
            .iter()
            .map(|c| {
                format!(
                    "{} {}",
                    c.category.label(),
                    style.paint(DIM, format!("{} ({})", format_size(c.total_size), format_count(c.file_count)))
                )
            })
            .collect::<Vec<_>>()
            .join("   ");
        let _ = writeln!(out, "{indent}{}  {cats}", style.paint(CYAN, "Categories:"));
    }

    let _ = writeln!(
        out,
        "{indent}{} {}",
        style.paint(MAGENTA, "Recent files:"),
        style.paint(
            recent_color,
            format!(
                "{} (last {} days)",
                format_count(s.recent_file_count),
                s.recency_window_days
            )
        )
    );
    if let (Some(oldest), Some(newest)) = (s.oldest_modified, s.newest_modified) {
        let _ = writeln!(
            out,
            "{indent}{}  {} .. {}",
            style.paint(MAGENTA, "Modified:"),
            oldest.format("%Y-%m-%d"),
            newest.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(
        out,
        "{indent}{}  {}",
        style.paint(YELLOW, "Empty dirs:"),
        format_count(s.empty_dir_count)
    );
    let _ = writeln!(
        out,
        "{indent}{} {}",
        style.paint(YELLOW, "Zero-byte files:"),
        format_count(s.zero_byte_file_count)
    );
    let _ = write!(
        out,
        "{indent}{}      {}",
        style.paint(error_color, "Errors:"),
        format_count(s.error_count)
    );

    for failure in s.errors.iter().take(MAX_LISTED_ERRORS) {
        let _ = write!(
            out,
            "\n{indent}  {} {}",
            style.paint(RED, format!("{:<22}", failure.kind.label())),
            failure.path.display()
        );
    }
    if s.errors.len() > MAX_LISTED_ERRORS {
        let _ = write!(
            out,
            "\n{indent}  {}",
            style.paint(DIM, format!("... and {} more", s.errors.len() - MAX_LISTED_ERRORS))
        );
    }

    out
}
