use crate::formatter::FormatOptions;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output: PathBuf,
    /// Explicit identifiers to export, in order. Empty means everything the source lists.
    pub ids: Vec<String>,
    pub format: FormatOptions,
    pub workers: usize,
}

impl ExportConfig {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ids: Vec::new(),
            format: FormatOptions::default(),
            workers: default_workers(),
        }
    }
}

/// Outcome of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub archive: PathBuf,
    pub exported: usize,
    /// Entries written empty because their conversation could not be formatted.
    pub empty: usize,
    pub entries: Vec<String>,
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
}

/// `conversations-YYYY-MM-DD.zip`
pub fn default_archive_name(date: NaiveDate) -> String {
    format!("conversations-{}.zip", date.format("%Y-%m-%d"))
}

/// Short form of an identifier for log lines.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((pos, _)) => &id[..pos],
        None => id,
    }
}
