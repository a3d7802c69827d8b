//! JSON report written after a batch run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tag_core::{BatchResult, BatchSummary, RowDiagnostic};

/// File name of the report inside the output folder.
pub const REPORT_FILE: &str = "batch_report.json";

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Local>,
    pub csv_path: PathBuf,
    pub format: String,
    pub summary: BatchSummary,
    /// Rows rejected while reading the CSV.
    pub skipped_rows: Vec<RowDiagnostic>,
    pub results: Vec<BatchResult>,
}

impl BatchReport {
    pub fn new(
        csv_path: &Path,
        format: &str,
        skipped_rows: Vec<RowDiagnostic>,
        results: Vec<BatchResult>,
    ) -> Self {
        Self {
            generated_at: Local::now(),
            csv_path: csv_path.to_path_buf(),
            format: format.to_string(),
            summary: BatchSummary::from_results(&results),
            skipped_rows,
            results,
        }
    }

    /// Write the report as pretty JSON into `folder`; returns its path.
    pub fn write_to(&self, folder: &Path) -> anyhow::Result<PathBuf> {
        let path = folder.join(REPORT_FILE);
        let json = serde_json::to_vec_pretty(self)?;
        tag_core::write_export(&path, &json)?;
        Ok(path)
    }
}
