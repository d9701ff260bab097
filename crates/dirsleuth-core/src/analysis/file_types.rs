/// File type categorisation based on file extensions.
///
/// The extension lists are process-wide read-only data. They are wrapped in
/// a [`CategoryTable`] that is handed to the aggregator through
/// `ScanOptions`, so callers can swap or extend the table without any
/// global mutable state.
use compact_str::CompactString;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".ico", ".webp",
];
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mov", ".wmv", ".flv", ".mpeg", ".mpg", ".m4v", ".mkv",
];
pub const AUDIO_EXTENSIONS: &[&str] = &[
    ".mp3", ".wav", ".ogg", ".m4a", ".flac", ".aac", ".wma", ".m4b", ".m4p",
];
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".xls", ".xlsx", ".ppt", ".pptx",
];
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip", ".tar", ".gz", ".bz2", ".xz", ".7z", ".rar"];
pub const CODE_EXTENSIONS: &[&str] = &[
    ".rs", ".py", ".js", ".ts", ".c", ".cpp", ".h", ".go", ".java", ".toml", ".json", ".yaml",
    ".yml", ".md", ".sh",
];

/// Broad file type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Images,
    Video,
    Audio,
    Documents,
    Archives,
    Code,
    Other,
}

impl FileCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Documents => "Documents",
            Self::Archives => "Archives",
            Self::Code => "Code",
            Self::Other => "Other",
        }
    }
}

/// Size and count totals for a single file category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: FileCategory,
    pub total_size: u64,
    pub file_count: u64,
}

/// Immutable extension → category lookup.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    by_extension: HashMap<CompactString, FileCategory>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::empty()
            .with(FileCategory::Images, IMAGE_EXTENSIONS)
            .with(FileCategory::Video, VIDEO_EXTENSIONS)
            .with(FileCategory::Audio, AUDIO_EXTENSIONS)
            .with(FileCategory::Documents, DOCUMENT_EXTENSIONS)
            .with(FileCategory::Archives, ARCHIVE_EXTENSIONS)
            .with(FileCategory::Code, CODE_EXTENSIONS)
    }
}

impl CategoryTable {
    /// A table where every extension is `Other`.
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Map each extension (with or without the leading dot, any case) to
    /// `category`. Later calls override earlier ones.
    pub fn with(mut self, category: FileCategory, extensions: &[&str]) -> Self {
        for ext in extensions {
            self.by_extension.insert(normalise(ext), category);
        }
        self
    }

    /// Category of a normalised extension such as `".png"`.
    pub fn categorise(&self, extension: &str) -> FileCategory {
        if extension.is_empty() {
            return FileCategory::Other;
        }
        match self.by_extension.get(extension) {
            Some(&cat) => cat,
            None => self
                .by_extension
                .get(&normalise(extension))
                .copied()
                .unwrap_or(FileCategory::Other),
        }
    }
}

fn normalise(ext: &str) -> CompactString {
    let trimmed = ext.trim_start_matches('.');
    let mut out = CompactString::with_capacity(trimmed.len() + 1);
    out.push('.');
    out.push_str(&trimmed.to_lowercase());
    out
}

/// Fold per-extension totals into per-category totals.
///
/// Sorted by total size descending; equal sizes fall back to category order
/// so the output is deterministic.
pub fn analyse_categories(
    sizes: &BTreeMap<String, u64>,
    counts: &BTreeMap<String, u64>,
    table: &CategoryTable,
) -> Vec<CategoryStats> {
    let mut map: HashMap<FileCategory, CategoryStats> = HashMap::new();

    for (ext, &count) in counts {
        let category = table.categorise(ext);
        let entry = map.entry(category).or_insert(CategoryStats {
            category,
            total_size: 0,
            file_count: 0,
        });
        entry.file_count += count;
        entry.total_size += sizes.get(ext).copied().unwrap_or(0);
    }

    let mut results: Vec<CategoryStats> = map.into_values().collect();
    results.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then(a.category.cmp(&b.category))
    });
    results
}
