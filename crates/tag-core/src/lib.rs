//! Product tag generation.
//!
//! Composes printable product tags (logo, QR code and four label/value
//! rows) onto a raster canvas sized from physical inches and DPI, exports
//! them as PNG/JPEG/PDF, and runs batches of tags from CSV rows.

pub mod batch;
pub mod compositor;
pub mod csv_input;
pub mod export;
pub mod layout;
pub mod product;
pub mod theme;

use std::path::{Path, PathBuf};

use image_engine::EngineError;

// Re-exports for convenience
pub use batch::{BatchOptions, BatchProgress, BatchResult, BatchSummary, run_batch, sanitize_filename};
pub use compositor::{TagAssets, TagCanvas, compose};
pub use csv_input::{CsvImport, RawRow, RowDiagnostic, parse_csv, read_csv};
pub use export::{ExportFormat, RenderOptions, export_tag, to_jpeg, to_pdf, to_png, write_export};
pub use layout::{LayoutMode, PhysicalCanvasSpec, TagGeometry};
pub use product::{ProductRecord, QcStatus};
pub use theme::{Theme, ThemePalette};

/// Errors raised while validating, rendering or exporting tags.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("{0}")]
    Validation(String),

    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Export to {} failed: {cause}", path.display())]
    Export { path: PathBuf, cause: String },

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<EngineError> for TagError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::QrDataTooLong { .. } | EngineError::QrEncode(_) => {
                TagError::Encoding(e.to_string())
            }
            EngineError::Png(_) | EngineError::Jpeg(_) | EngineError::Pdf(_) | EngineError::Io(_) => {
                TagError::Export {
                    path: PathBuf::new(),
                    cause: e.to_string(),
                }
            }
            other => TagError::Render(other.to_string()),
        }
    }
}

impl TagError {
    /// Report this failure as an export to `path`.
    ///
    /// Encoder errors are raised before the target is known; this fills it in.
    pub fn at_path(self, path: &Path) -> Self {
        let cause = match self {
            TagError::Export { cause, .. } => cause,
            other => other.to_string(),
        };
        TagError::Export {
            path: path.to_path_buf(),
            cause,
        }
    }
}

/// Result type alias for tag operations.
pub type Result<T> = std::result::Result<T, TagError>;

#[cfg(test)]
mod tests;
