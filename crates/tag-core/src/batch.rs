//! Batch runner: one exported tag per CSV row.
//!
//! Rows are processed in order and every row yields exactly one
//! [`BatchResult`]; a failing row is recorded and the run continues.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compositor::{TagAssets, compose};
use crate::csv_input::RawRow;
use crate::export::{ExportFormat, encode, write_export};
use crate::layout::{LayoutMode, PhysicalCanvasSpec};
use crate::product::ProductRecord;
use crate::theme::Theme;
use crate::{Result, TagError};

/// Longest file stem produced by [`sanitize_filename`], in characters.
pub const MAX_BASENAME_CHARS: usize = 200;

/// Stem used when a row's name sanitizes to nothing.
const FALLBACK_BASENAME: &str = "tag";

static RE_ILLEGAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:"*?<>|]+"#).unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Settings shared by every row of a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_folder: PathBuf,
    /// Requested format name; rows may override it with a `format` column.
    pub format: String,
    pub layout: LayoutMode,
    pub theme: Theme,
    pub canvas: PhysicalCanvasSpec,
}

/// Outcome of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub output_path: PathBuf,
    pub success: bool,
    pub message: String,
}

/// Rows finished so far, reported after each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Whole-number percentage; an empty batch counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }
}

/// Totals over a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

/// Make `name` safe to use as a file stem.
///
/// Runs of `\ / : * ? " < > |` and of whitespace become `_`, leading and
/// trailing `_` are dropped and the result is cut to
/// [`MAX_BASENAME_CHARS`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = RE_ILLEGAL.replace_all(name, "_");
    let cleaned = RE_WHITESPACE.replace_all(&cleaned, "_");
    cleaned
        .trim_matches('_')
        .chars()
        .take(MAX_BASENAME_CHARS)
        .collect()
}

/// Output stem for a row: `output_basename` when given, else
/// `{part_number}_{product_name}`.
fn row_basename(row: &RawRow) -> String {
    let get = |key: &str| row.get(key).map(|v| v.trim()).unwrap_or_default();
    let raw = match get("output_basename") {
        "" => format!("{}_{}", get("part_number"), get("product_name")),
        explicit => explicit.to_string(),
    };
    let stem = sanitize_filename(&raw);
    if stem.is_empty() {
        FALLBACK_BASENAME.to_string()
    } else {
        stem
    }
}

/// Export one tag per row into `options.output_folder`.
///
/// `on_progress` is called after every row, successful or not.
pub fn run_batch(
    rows: &[RawRow],
    options: &BatchOptions,
    assets: &TagAssets,
    mut on_progress: impl FnMut(BatchProgress),
) -> Vec<BatchResult> {
    let total = rows.len();
    let folder_error = std::fs::create_dir_all(&options.output_folder)
        .err()
        .map(|e| format!("Cannot create {}: {e}", options.output_folder.display()));

    let mut results = Vec::with_capacity(total);
    for (idx, row) in rows.iter().enumerate() {
        let format_name = row
            .get("format")
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .unwrap_or(options.format.as_str());
        let format = ExportFormat::parse(format_name);
        let path = output_path(&options.output_folder, &row_basename(row), format, format_name);

        let outcome = match (&folder_error, format) {
            (Some(err), _) => Err(TagError::Export {
                path: path.clone(),
                cause: err.clone(),
            }),
            (None, None) => Err(TagError::Validation(format!("Unsupported format {format_name}"))),
            (None, Some(format)) => export_row(row, format, &path, options, assets),
        };

        let result = match outcome {
            Ok(()) => {
                debug!(row = idx + 1, path = %path.display(), "Batch row exported");
                BatchResult {
                    output_path: path,
                    success: true,
                    message: "OK".into(),
                }
            }
            Err(e) => {
                warn!(row = idx + 1, path = %path.display(), "Batch row failed: {e}");
                BatchResult {
                    output_path: path,
                    success: false,
                    message: e.to_string(),
                }
            }
        };
        results.push(result);
        on_progress(BatchProgress {
            completed: idx + 1,
            total,
        });
    }

    let summary = BatchSummary::from_results(&results);
    info!(
        folder = %options.output_folder.display(),
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch finished"
    );
    results
}

fn output_path(folder: &Path, stem: &str, format: Option<ExportFormat>, requested: &str) -> PathBuf {
    let ext = match format {
        Some(f) => f.extension().to_string(),
        None => sanitize_filename(requested).to_ascii_lowercase(),
    };
    if ext.is_empty() {
        folder.join(stem)
    } else {
        folder.join(format!("{stem}.{ext}"))
    }
}

fn export_row(
    row: &RawRow,
    format: ExportFormat,
    path: &Path,
    options: &BatchOptions,
    assets: &TagAssets,
) -> Result<()> {
    let product = ProductRecord::from_row(row)?;
    let canvas = compose(
        &product,
        options.layout,
        &options.theme.palette(),
        &options.canvas,
        assets,
    )?;
    let bytes = encode(&canvas, format).map_err(|e| e.at_path(path))?;
    write_export(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, part: &str) -> RawRow {
        let mut r = RawRow::new();
        r.insert("product_name".into(), name.into());
        r.insert("part_number".into(), part.into());
        r.insert("qc_status".into(), "Approved".into());
        r
    }

    fn options(folder: &Path, format: &str) -> BatchOptions {
        BatchOptions {
            output_folder: folder.to_path_buf(),
            format: format.into(),
            layout: LayoutMode::Vertical,
            theme: Theme::Light,
            canvas: PhysicalCanvasSpec::new(2.0, 1.5, 100),
        }
    }

    #[test]
    fn sanitize_replaces_illegal_characters_and_whitespace() {
        assert_eq!(sanitize_filename("My/Product:Name*?"), "My_Product_Name");
        assert_eq!(sanitize_filename("a  b\tc"), "a_b_c");
        assert_eq!(sanitize_filename(r#"x\y"z<w>|v"#), "x_y_z_w_v");
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn sanitize_truncates_by_characters() {
        let long = "é".repeat(300);
        let out = sanitize_filename(&long);
        assert_eq!(out.chars().count(), MAX_BASENAME_CHARS);
    }

    #[test]
    fn basename_prefers_explicit_field() {
        let mut r = row("Widget Pro", "PN-1");
        assert_eq!(row_basename(&r), "PN-1_Widget_Pro");
        r.insert("output_basename".into(), "custom name".into());
        assert_eq!(row_basename(&r), "custom_name");
        r.insert("output_basename".into(), "  ".into());
        assert_eq!(row_basename(&r), "PN-1_Widget_Pro");
    }

    #[test]
    fn unnameable_row_uses_fallback_stem() {
        let mut r = RawRow::new();
        r.insert("output_basename".into(), "***".into());
        assert_eq!(row_basename(&r), FALLBACK_BASENAME);
    }

    #[test]
    fn unsupported_format_fails_every_row_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![row("Widget", "PN-1"), row("Gadget", "PN-2")];
        let results = run_batch(&rows, &options(dir.path(), "TIFF"), &TagAssets::none(), |_| {});
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(!r.success);
            assert_eq!(r.message, "Unsupported format TIFF");
            assert_eq!(r.output_path.extension().unwrap(), "tiff");
        }
    }

    #[test]
    fn progress_is_reported_after_each_row() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![row("Widget", "PN-1"), row("", "PN-2"), row("Gizmo", "PN-3")];
        let mut seen = Vec::new();
        let results = run_batch(&rows, &options(dir.path(), "png"), &TagAssets::none(), |p| {
            seen.push(p)
        });
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().unwrap().percent(), 100);
        assert_eq!(seen[0].percent(), 33);
        assert!(!results[1].success);
        assert!(results[1].message.contains("Product Name"));
    }

    #[test]
    fn uncreatable_folder_fails_rows_not_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let rows = vec![row("Widget", "PN-1")];
        let results = run_batch(&rows, &options(&blocker.join("out"), "png"), &TagAssets::none(), |_| {});
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(results[0].message.contains("Cannot create"));
    }

    #[test]
    fn summary_counts_outcomes() {
        let ok = BatchResult {
            output_path: PathBuf::from("a.png"),
            success: true,
            message: "OK".into(),
        };
        let bad = BatchResult {
            success: false,
            ..ok.clone()
        };
        let summary = BatchSummary::from_results(&[ok, bad.clone(), bad]);
        assert_eq!(summary, BatchSummary { total: 3, succeeded: 1, failed: 2 });
    }

    #[test]
    fn empty_batch_progress_is_complete() {
        assert_eq!(BatchProgress { completed: 0, total: 0 }.percent(), 100);
    }
}
