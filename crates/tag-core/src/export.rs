//! Tag export: encode a composed tag and write it atomically to disk.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image_engine::export::JPEG_QUALITY;
use tempfile::NamedTempFile;
use tracing::info;

use crate::compositor::{TagAssets, TagCanvas, compose};
use crate::layout::{LayoutMode, PhysicalCanvasSpec};
use crate::product::ProductRecord;
use crate::theme::Theme;
use crate::{Result, TagError};

const PDF_TITLE: &str = "Product Tag";

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    /// Case-insensitive lookup of `png`, `jpg`, `jpeg` or `pdf`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| TagError::Validation(format!("Unsupported format {s}")))
    }
}

/// Everything besides the product that decides how a tag looks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOptions {
    pub layout: LayoutMode,
    pub theme: Theme,
    pub canvas: PhysicalCanvasSpec,
}

/// Lossless PNG carrying `dpi` in its `pHYs` chunk.
pub fn to_png(canvas: &TagCanvas, dpi: u32) -> Result<Vec<u8>> {
    Ok(image_engine::encode_png(canvas.image(), dpi)?)
}

/// RGB JPEG at quality 95, alpha flattened onto white, with JFIF density `dpi`.
pub fn to_jpeg(canvas: &TagCanvas, dpi: u32) -> Result<Vec<u8>> {
    Ok(image_engine::encode_jpeg(canvas.image(), dpi, JPEG_QUALITY)?)
}

/// Single-page PDF of `width_in`×`height_in` inches with the tag full-bleed.
pub fn to_pdf(canvas: &TagCanvas, width_in: f64, height_in: f64) -> Result<Vec<u8>> {
    Ok(image_engine::encode_pdf(
        canvas.image(),
        width_in as f32,
        height_in as f32,
        PDF_TITLE,
    )?)
}

/// Encode `canvas` as `format` using the physical size it was composed for.
pub fn encode(canvas: &TagCanvas, format: ExportFormat) -> Result<Vec<u8>> {
    let spec = *canvas.spec();
    match format {
        ExportFormat::Png => to_png(canvas, spec.dpi),
        ExportFormat::Jpeg => to_jpeg(canvas, spec.dpi),
        ExportFormat::Pdf => to_pdf(canvas, spec.width_in, spec.height_in),
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The target only appears once the data is fully written; on failure no
/// file is left at `path`.
pub fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    let export_err = |cause: String| TagError::Export {
        path: path.to_path_buf(),
        cause,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| export_err(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| export_err(e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| export_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| export_err(e.error.to_string()))?;
    Ok(())
}

/// Validate, compose, encode and write one tag. Returns the written path.
pub fn export_tag(
    product: &ProductRecord,
    format: ExportFormat,
    path: &Path,
    options: &RenderOptions,
    assets: &TagAssets,
) -> Result<PathBuf> {
    product.validate()?;
    let canvas = compose(
        product,
        options.layout,
        &options.theme.palette(),
        &options.canvas,
        assets,
    )?;
    let bytes = encode(&canvas, format).map_err(|e| e.at_path(path))?;
    write_export(path, &bytes)?;
    info!(
        path = %path.display(),
        format = %format,
        bytes = bytes.len(),
        "Exported tag"
    );
    Ok(path.to_path_buf())
}
