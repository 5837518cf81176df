//! Rendering and writing analysis results.

use chrono::NaiveDate;
use clap::ValueEnum;
use comps::output::{CompsReport, ExportError, ExportFormat, Exporter, default_filename};
use std::path::{Path, PathBuf};

/// How `analyze` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width text table
    Table,
    /// Markdown tables
    Markdown,
    /// One CSV row per company
    Csv,
    /// Pretty-printed JSON report
    Json,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Render `report` in this format.
    pub(crate) fn render(self, report: &CompsReport) -> Result<String, ExportError> {
        match self {
            Self::Table => Ok(report.to_ascii_table()),
            Self::Markdown => Ok(report.to_markdown()),
            Self::Csv => report.export_to_string(ExportFormat::Csv),
            Self::Json => report.export_to_string(ExportFormat::PrettyJson),
        }
    }

    /// Where to write: `path` itself, or a dated file name inside it when it
    /// is a directory.
    pub(crate) fn destination(self, path: &Path, target: &str, date: NaiveDate) -> PathBuf {
        if path.is_dir() {
            let name = default_filename(target, date, ExportFormat::Csv);
            path.join(name).with_extension(self.extension())
        } else {
            path.to_path_buf()
        }
    }
}
