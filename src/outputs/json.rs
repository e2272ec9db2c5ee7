//! JSON output for a run.
//!
//! # Output Structure
//!
//! Files are organized by run date, one file per page type:
//! ```text
//! output_dir/
//! └── 2026-04-09/
//!     ├── season.json
//!     └── scorecard.json
//! ```
//!
//! A second run of the same page type on the same day replaces the file.

use crate::models::RunReport;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the report file: `{output_dir}/{run_date}/{page}.json`.
pub fn report_path(report: &RunReport, output_dir: &str) -> PathBuf {
    PathBuf::from(output_dir)
        .join(&report.run_date)
        .join(format!("{}.json", report.page))
}

/// Write a [`RunReport`] under its dated directory.
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir, page = %report.page))]
pub async fn write_report(report: &RunReport, output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string(report)?;
    let path = report_path(report, output_dir);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), records = report.records.len(), "Wrote JSON report");
    Ok(path)
}
