pub mod csv;
pub mod json;

pub use self::csv::{read_csv, write_csv};
pub use self::json::write_json;

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

use crate::domain::ResultSet;
use crate::error::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Timestamped default export name, e.g. `business_listings_20241019_142501.csv`
pub fn default_file_name<Tz: TimeZone>(now: &DateTime<Tz>, format: ExportFormat) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from(format!(
        "business_listings_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Write the result set to `path` and return the number of rows written
pub fn export_results(
    results: &ResultSet,
    path: &Path,
    format: ExportFormat,
) -> Result<usize, SearchError> {
    match format {
        ExportFormat::Csv => write_csv(path, results.records())?,
        ExportFormat::Json => write_json(path, results.records())?,
    }
    tracing::info!(path = %path.display(), rows = results.len(), "exported results");
    Ok(results.len())
}
