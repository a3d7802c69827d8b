//! Tag geometry: canvas size from physical dimensions, and the placement
//! of frame, logo, QR code and label/value rows for each layout mode.
//!
//! Proportions are truncated to whole pixels at each step, so the same
//! inputs always yield the same rectangles.

use image_engine::Rect;
use tracing::debug;

use crate::{Result, TagError};

/// Largest canvas side accepted, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 20_000;

/// Frame corner radius in device pixels, independent of DPI.
pub const FRAME_RADIUS: u32 = 12;

/// Text drawn in the logo box when no logo image is available.
pub const LOGO_PLACEHOLDER: &str = "KII Logo";

/// Gap between a QC indicator and its status text.
pub const INDICATOR_TEXT_GAP: i32 = 8;

/// Arrangement of logo, QR code and rows on the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Logo and QR side by side on top, rows below.
    #[default]
    Vertical,
    /// Logo and rows in a left column, QR in a right column.
    Horizontal,
}

impl LayoutMode {
    /// Case-insensitive lookup; unknown names fall back to `Vertical`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "vertical" => Self::Vertical,
            "horizontal" => Self::Horizontal,
            other => {
                tracing::warn!(layout = other, "Unknown layout, falling back to Vertical");
                Self::Vertical
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vertical => "Vertical",
            Self::Horizontal => "Horizontal",
        }
    }
}

/// Physical print size and resolution of a tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalCanvasSpec {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for PhysicalCanvasSpec {
    fn default() -> Self {
        Self {
            width_in: 4.0,
            height_in: 3.0,
            dpi: 600,
        }
    }
}

impl PhysicalCanvasSpec {
    pub const fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    /// Pixel dimensions: `round(inches × dpi)` on each axis.
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        if self.dpi == 0 {
            return Err(TagError::Render("DPI must be greater than zero".into()));
        }
        let w = to_pixels(self.width_in, self.dpi, "width")?;
        let h = to_pixels(self.height_in, self.dpi, "height")?;
        Ok((w, h))
    }
}

fn to_pixels(inches: f64, dpi: u32, axis: &str) -> Result<u32> {
    if !inches.is_finite() || inches <= 0.0 {
        return Err(TagError::Render(format!("{axis} must be positive, got {inches} in")));
    }
    let px = (inches * f64::from(dpi)).round();
    if px < 1.0 {
        return Err(TagError::Render(format!(
            "{axis} of {inches} in at {dpi} DPI is less than one pixel"
        )));
    }
    if px > f64::from(MAX_CANVAS_SIDE) {
        return Err(TagError::Render(format!(
            "{axis} of {px} px exceeds the {MAX_CANVAS_SIDE} px limit"
        )));
    }
    Ok(px as u32)
}

/// Field shown in one tag row; discriminants follow row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    ProductName,
    PartNumber,
    QcStatus,
    MadeIn,
}

impl TagField {
    /// Rows in top-to-bottom order.
    pub const ROWS: [TagField; 4] = [
        TagField::ProductName,
        TagField::PartNumber,
        TagField::QcStatus,
        TagField::MadeIn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProductName => "Product Name",
            Self::PartNumber => "Part Number",
            Self::QcStatus => "QC Status",
            Self::MadeIn => "Made In",
        }
    }
}

/// Cells of one label/value row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    pub field: TagField,
    pub label: Rect,
    pub value: Rect,
    /// One pixel high line under the row.
    pub separator: Rect,
}

impl RowGeometry {
    /// Square holding the QC indicator circle, at the left of the value cell.
    pub fn indicator(&self) -> Rect {
        let d = 6.max((f64::from(self.label.height) * 0.28) as i32);
        Rect::new(self.value.x, self.value.y + (self.value.height - d) / 2, d, d)
    }

    /// Cell for the QC status text, right of the indicator.
    pub fn status_text(&self) -> Rect {
        let ind = self.indicator();
        Rect::new(
            ind.x + ind.width + INDICATOR_TEXT_GAP,
            self.value.y,
            self.value.width - ind.width - 12,
            self.value.height,
        )
    }
}

/// Every rectangle and size needed to draw a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagGeometry {
    pub width: u32,
    pub height: u32,
    /// Frame path; the stroke is centred on it.
    pub frame: Rect,
    pub frame_stroke: u32,
    pub inner: Rect,
    /// Box the logo is fitted into; its top-left corner anchors the logo.
    pub logo_box: Rect,
    pub qr_area: Rect,
    /// Horizontal optical offset applied to the fitted QR.
    pub qr_offset_x: i32,
    /// Side length the QR symbol is rendered at before downscaling.
    pub qr_render_px: u32,
    pub rows: [RowGeometry; 4],
    pub label_font_pt: f32,
    pub value_font_pt: f32,
    pub placeholder_font_pt: f32,
}

fn pct(v: i32, p: f64) -> i32 {
    (f64::from(v) * p) as i32
}

/// Columns shared by the rows of either layout.
struct RowBand {
    x: i32,
    y: i32,
    width: i32,
    row_h: i32,
    label_col_w: i32,
    value_col_x: i32,
    value_col_w: i32,
}

impl RowBand {
    fn rows(&self) -> [RowGeometry; 4] {
        std::array::from_fn(|i| {
            let field = TagField::ROWS[i];
            let ry = self.y + i as i32 * self.row_h;
            RowGeometry {
                field,
                label: Rect::new(self.x + 4, ry, self.label_col_w - 8, self.row_h),
                value: Rect::new(self.value_col_x + 2, ry, self.value_col_w, self.row_h),
                separator: Rect::new(self.x, ry + self.row_h, self.width, 1),
            }
        })
    }
}

impl TagGeometry {
    /// Compute the geometry of a tag for `layout` at `spec`.
    pub fn compute(layout: LayoutMode, spec: &PhysicalCanvasSpec) -> Result<Self> {
        let (width, height) = spec.pixel_size()?;
        let (px_w, px_h) = (width as i32, height as i32);

        let frame_pad = 4.max(pct(px_w, 0.01));
        let frame = Rect::new(frame_pad, frame_pad, px_w - 2 * frame_pad, px_h - 2 * frame_pad);
        let frame_stroke = 2.max(pct(px_w, 0.004)) as u32;

        let pad_x = pct(px_w, 0.04);
        let pad_y = pct(px_h, 0.04);
        let inner = frame.inset(pad_x, pad_y);

        let row_gap = pct(px_h, 0.02);

        let (logo_box, qr_area, qr_offset_x, qr_floor, band) = match layout {
            LayoutMode::Vertical => {
                let top_h = pct(inner.height, 0.38);
                let left_w = pct(inner.width, 0.58);
                let right_w = inner.width - left_w;

                let logo_box = fit_logo_box(inner.x, inner.y, left_w, top_h, 0.70, 0.10);

                let margin = pct(right_w.min(top_h), 0.08);
                let qr_area = Rect::new(
                    inner.x + left_w + margin,
                    inner.y + margin,
                    right_w - 2 * margin,
                    top_h - 2 * margin,
                );

                let label_col_w = pct(inner.width, 0.36);
                let gutter = pct(px_w, 0.05);
                let value_col_x = inner.x + label_col_w + gutter;
                let band = RowBand {
                    x: inner.x,
                    y: inner.y + top_h + row_gap,
                    width: inner.width,
                    row_h: (inner.height - top_h - row_gap) / 4,
                    label_col_w,
                    value_col_x,
                    value_col_w: inner.width - label_col_w - gutter - 8,
                };
                (logo_box, qr_area, 0, 2400, band)
            }
            LayoutMode::Horizontal => {
                let left_w = pct(inner.width, 0.60);
                let right_w = inner.width - left_w;
                let logo_area_h = pct(inner.height, 0.40);

                let logo_box = fit_logo_box(inner.x, inner.y, left_w, logo_area_h, 0.78, 0.08);

                let margin = pct(right_w.min(inner.height), 0.06);
                let qr_area = Rect::new(
                    inner.x + left_w + margin,
                    inner.y + margin,
                    right_w - 2 * margin,
                    inner.height - 2 * margin,
                );

                let label_col_w = pct(left_w, 0.45);
                let gutter = pct(px_w, 0.04);
                let value_col_x = inner.x + label_col_w + gutter;
                let band = RowBand {
                    x: inner.x,
                    y: inner.y + logo_area_h + row_gap,
                    width: left_w,
                    row_h: (inner.height - logo_area_h - row_gap) / 4,
                    label_col_w,
                    value_col_x,
                    value_col_w: left_w - label_col_w - gutter - 6,
                };
                (logo_box, qr_area, pct(left_w, 0.03), 2600, band)
            }
        };

        let qr_render_px = qr_floor.max(4 * qr_area.width.min(qr_area.height).max(0)) as u32;

        let geometry = Self {
            width,
            height,
            frame,
            frame_stroke,
            inner,
            logo_box,
            qr_area,
            qr_offset_x,
            qr_render_px,
            rows: band.rows(),
            label_font_pt: 8.max(pct(px_w, 0.028)) as f32,
            value_font_pt: 10.max(pct(px_w, 0.035)) as f32,
            placeholder_font_pt: 10.max(pct(px_w, 0.032)) as f32,
        };
        debug!(
            layout = layout.name(),
            width,
            height,
            inner = ?geometry.inner,
            qr_area = ?geometry.qr_area,
            "Computed tag geometry"
        );
        Ok(geometry)
    }

    /// Where the square QR lands once fitted into `qr_area` and offset.
    pub fn qr_rect(&self) -> Rect {
        let side = self.qr_area.width.min(self.qr_area.height).max(0);
        Rect::new(
            self.qr_area.x + (self.qr_area.width - side) / 2 + self.qr_offset_x,
            self.qr_area.y + (self.qr_area.height - side) / 2,
            side,
            side,
        )
    }

    pub fn row(&self, field: TagField) -> &RowGeometry {
        &self.rows[field as usize]
    }
}

/// Logo box scaled to `fill` of its column, centred and nudged left by
/// `nudge` of the column width, never closer than 2px to the column edge.
fn fit_logo_box(x: i32, y: i32, col_w: i32, col_h: i32, fill: f64, nudge: f64) -> Rect {
    let max_w = pct(col_w, fill);
    let max_h = pct(col_h, fill);
    let centered_x = x + (col_w - max_w) / 2;
    let nudge_left = 0.max(pct(col_w, nudge));
    let logo_x = (x + 2).max(centered_x - nudge_left);
    let logo_y = y + (col_h - max_h) / 2;
    Rect::new(logo_x, logo_y, max_w, max_h)
}
