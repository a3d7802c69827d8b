//! Tag compositor: draws a product tag onto a [`DrawSurface`].
//!
//! All placement comes from [`TagGeometry`]; this module only decides what
//! goes into each rectangle and with which colour and font.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use image_engine::qr::DEFAULT_LOGO_SCALE;
use image_engine::text::points_to_px;
use image_engine::{DrawSurface, FontSet, Rect, RgbaSurface, TextAlign, TextStyle};
use tracing::{debug, warn};

use crate::layout::{FRAME_RADIUS, LOGO_PLACEHOLDER, LayoutMode, PhysicalCanvasSpec, TagField, TagGeometry};
use crate::product::ProductRecord;
use crate::theme::ThemePalette;
use crate::{Result, TagError};

/// External resources a tag is drawn with. Every member is optional.
#[derive(Default)]
pub struct TagAssets {
    /// General logo shown in the logo box.
    pub logo: Option<DynamicImage>,
    /// Logo composited in the centre of the QR code.
    pub qr_logo: Option<DynamicImage>,
    pub fonts: FontSet,
}

impl TagAssets {
    /// No logos and no fonts: only shapes and the QR code are drawn.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load logo images from disk. Missing or undecodable files leave the
    /// corresponding slot empty.
    pub fn load(logo_path: Option<&Path>, qr_logo_path: Option<&Path>, fonts: FontSet) -> Self {
        Self {
            logo: logo_path.and_then(load_logo),
            qr_logo: qr_logo_path.and_then(load_logo),
            fonts,
        }
    }

    /// Centre logo for the QR code: the dedicated QR logo, else the general one.
    pub fn qr_center_logo(&self) -> Option<&DynamicImage> {
        self.qr_logo.as_ref().or(self.logo.as_ref())
    }
}

fn load_logo(path: &Path) -> Option<DynamicImage> {
    if !path.exists() {
        debug!(path = %path.display(), "Logo file not found, skipping");
        return None;
    }
    match image::open(path) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(path = %path.display(), "Ignoring undecodable logo: {e}");
            None
        }
    }
}

/// A finished tag raster together with the size it was composed for.
#[derive(Debug, Clone)]
pub struct TagCanvas {
    image: RgbaImage,
    spec: PhysicalCanvasSpec,
    geometry: TagGeometry,
}

impl TagCanvas {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn spec(&self) -> &PhysicalCanvasSpec {
        &self.spec
    }

    /// Geometry the tag was laid out with.
    pub fn geometry(&self) -> &TagGeometry {
        &self.geometry
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Compose a tag for `product` at the physical size of `spec`.
///
/// The result has exactly `round(width_in × dpi)` × `round(height_in × dpi)`
/// pixels. Absent logos fall back to a placeholder (general logo) or are
/// skipped (QR centre logo).
pub fn compose(
    product: &ProductRecord,
    layout: LayoutMode,
    palette: &ThemePalette,
    spec: &PhysicalCanvasSpec,
    assets: &TagAssets,
) -> Result<TagCanvas> {
    let geometry = TagGeometry::compute(layout, spec)?;
    let mut surface = RgbaSurface::new(geometry.width, geometry.height, palette.background);
    draw_tag(&mut surface, &geometry, product, palette, assets)?;
    debug!(
        part_number = %product.part_number,
        layout = layout.name(),
        width = geometry.width,
        height = geometry.height,
        "Composed tag"
    );
    Ok(TagCanvas {
        image: surface.into_image(),
        spec: *spec,
        geometry,
    })
}

/// Draw every tag element onto `surface`, which must already be filled
/// with the background and match the geometry's size.
pub fn draw_tag<S: DrawSurface>(
    surface: &mut S,
    geometry: &TagGeometry,
    product: &ProductRecord,
    palette: &ThemePalette,
    assets: &TagAssets,
) -> Result<()> {
    if (surface.width(), surface.height()) != (geometry.width, geometry.height) {
        return Err(TagError::Render(format!(
            "surface is {}x{}, geometry expects {}x{}",
            surface.width(),
            surface.height(),
            geometry.width,
            geometry.height
        )));
    }

    draw_frame(surface, geometry, palette);
    draw_logo(surface, geometry, palette, assets);
    draw_qr(surface, geometry, product, assets)?;
    draw_rows(surface, geometry, product, palette, &assets.fonts);
    Ok(())
}

fn draw_frame<S: DrawSurface>(surface: &mut S, geometry: &TagGeometry, palette: &ThemePalette) {
    // The stroke straddles the frame path.
    let half = (geometry.frame_stroke / 2) as i32;
    let outer = geometry.frame.inset(-half, -half);
    surface.stroke_rounded_rect(
        outer,
        FRAME_RADIUS + half as u32,
        geometry.frame_stroke,
        palette.frame,
    );
}

fn draw_logo<S: DrawSurface>(
    surface: &mut S,
    geometry: &TagGeometry,
    palette: &ThemePalette,
    assets: &TagAssets,
) {
    let bx = geometry.logo_box;
    if bx.is_empty() {
        return;
    }

    if let Some(logo) = &assets.logo {
        match image_engine::fit_within(logo, bx.width as u32, bx.height as u32, FilterType::Lanczos3) {
            Some(scaled) => {
                surface.composite_image(&scaled, bx.x, bx.y);
                return;
            }
            None => warn!(box_w = bx.width, box_h = bx.height, "Logo does not fit its box"),
        }
    }

    if let Some(font) = assets.fonts.sans() {
        let style = TextStyle {
            font,
            size_px: points_to_px(geometry.placeholder_font_pt),
            color: palette.muted_text,
        };
        surface.draw_text(bx, LOGO_PLACEHOLDER, &style, TextAlign::Center);
    }
}

fn draw_qr<S: DrawSurface>(
    surface: &mut S,
    geometry: &TagGeometry,
    product: &ProductRecord,
    assets: &TagAssets,
) -> Result<()> {
    let target = geometry.qr_rect();
    if target.is_empty() {
        debug!(qr_area = ?geometry.qr_area, "No room for the QR code, skipping");
        return Ok(());
    }

    let symbol = image_engine::generate_qr(
        &product.qr_payload(),
        geometry.qr_render_px,
        assets.qr_center_logo(),
        DEFAULT_LOGO_SCALE,
    )?;
    let symbol = DynamicImage::ImageRgba8(symbol);
    let Some(scaled) = image_engine::fit_within(
        &symbol,
        target.width as u32,
        target.height as u32,
        FilterType::Triangle,
    ) else {
        debug!(side = target.width, "QR code scaled to nothing, skipping");
        return Ok(());
    };

    debug!(
        render_px = geometry.qr_render_px,
        side = scaled.width(),
        "Placing QR code"
    );
    surface.draw_image(&scaled, target.x, target.y);
    Ok(())
}

fn field_value(product: &ProductRecord, field: TagField) -> &str {
    match field {
        TagField::ProductName => &product.product_name,
        TagField::PartNumber => &product.part_number,
        TagField::QcStatus => product.qc_status.as_str(),
        TagField::MadeIn => &product.made_in,
    }
}

fn draw_rows<S: DrawSurface>(
    surface: &mut S,
    geometry: &TagGeometry,
    product: &ProductRecord,
    palette: &ThemePalette,
    fonts: &FontSet,
) {
    let label_px = points_to_px(geometry.label_font_pt);
    let value_px = points_to_px(geometry.value_font_pt);

    for row in &geometry.rows {
        if let Some(font) = fonts.sans() {
            let style = TextStyle {
                font,
                size_px: label_px,
                color: palette.muted_text,
            };
            surface.draw_text(row.label, row.field.label(), &style, TextAlign::Left);
        }

        let value_cell: Rect = if row.field == TagField::QcStatus {
            surface.fill_ellipse(row.indicator(), product.qc_status.indicator_color());
            row.status_text()
        } else {
            row.value
        };

        if let Some(font) = fonts.mono() {
            let style = TextStyle {
                font,
                size_px: value_px,
                color: palette.text,
            };
            surface.draw_text(value_cell, field_value(product, row.field), &style, TextAlign::Left);
        }

        surface.fill_rect(row.separator, palette.separator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::QcStatus;
    use crate::theme::Theme;
    use image::Rgba;

    fn product(status: &str) -> ProductRecord {
        ProductRecord::new("Widget", "PN-1", status, "Japan", "https://example.com/pn-1")
    }

    fn small_spec() -> PhysicalCanvasSpec {
        PhysicalCanvasSpec::new(4.0, 3.0, 150)
    }

    #[test]
    fn canvas_matches_physical_size() {
        let canvas = compose(
            &product("Approved"),
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &small_spec(),
            &TagAssets::none(),
        )
        .unwrap();
        assert_eq!((canvas.width(), canvas.height()), (600, 450));
        assert_eq!(canvas.spec().dpi, 150);
    }

    #[test]
    fn background_fills_outside_frame() {
        let palette = Theme::Dark.palette();
        let canvas = compose(
            &product("Approved"),
            LayoutMode::Horizontal,
            &palette,
            &small_spec(),
            &TagAssets::none(),
        )
        .unwrap();
        assert_eq!(canvas.image().get_pixel(0, 0), &palette.background);
        assert_eq!(canvas.image().get_pixel(599, 449), &palette.background);
    }

    #[test]
    fn frame_is_drawn_on_its_path() {
        let canvas = compose(
            &product("Approved"),
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &small_spec(),
            &TagAssets::none(),
        )
        .unwrap();
        let frame = canvas.geometry().frame;
        let (cx, _) = frame.center();
        let on_path = canvas.image().get_pixel(cx as u32, frame.y as u32);
        assert_ne!(on_path, &ThemePalette::LIGHT.background);
    }

    #[test]
    fn indicator_uses_status_colour() {
        for status in ["Approved", "Not Approved", "Prototype", "Pending"] {
            let p = product(status);
            let canvas = compose(
                &p,
                LayoutMode::Vertical,
                &ThemePalette::LIGHT,
                &small_spec(),
                &TagAssets::none(),
            )
            .unwrap();
            let (cx, cy) = canvas.geometry().row(TagField::QcStatus).indicator().center();
            assert_eq!(
                canvas.image().get_pixel(cx as u32, cy as u32),
                &p.qc_status.indicator_color(),
                "{status}"
            );
        }
    }

    #[test]
    fn logo_is_drawn_at_box_corner() {
        let red = Rgba([200, 20, 20, 255]);
        let assets = TagAssets {
            logo: Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, red))),
            ..TagAssets::default()
        };
        let canvas = compose(
            &product("Approved"),
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &small_spec(),
            &assets,
        )
        .unwrap();
        let bx = canvas.geometry().logo_box;
        assert_eq!(canvas.image().get_pixel(bx.x as u32 + 2, bx.y as u32 + 2), &red);
    }

    #[test]
    fn qr_logo_falls_back_to_general_logo() {
        let logo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        let assets = TagAssets {
            logo: Some(logo),
            ..TagAssets::default()
        };
        assert!(assets.qr_center_logo().is_some());
        assert!(TagAssets::none().qr_center_logo().is_none());
    }

    #[test]
    fn missing_logo_files_are_not_errors() {
        let assets = TagAssets::load(
            Some(Path::new("/nonexistent/kii_logo.png")),
            Some(Path::new("/nonexistent/kiiqr.png")),
            FontSet::empty(),
        );
        assert!(assets.logo.is_none());
        assert!(assets.qr_logo.is_none());
    }

    #[test]
    fn oversized_payload_is_an_encoding_error() {
        let mut p = product("Approved");
        p.catalog_url = format!("https://example.com/{}", "a".repeat(3000));
        let err = compose(
            &p,
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &small_spec(),
            &TagAssets::none(),
        )
        .unwrap_err();
        assert!(matches!(err, TagError::Encoding(_)));
    }

    #[test]
    fn degenerate_canvas_is_a_render_error() {
        let err = compose(
            &product("Approved"),
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &PhysicalCanvasSpec::new(0.0, 3.0, 300),
            &TagAssets::none(),
        )
        .unwrap_err();
        assert!(matches!(err, TagError::Render(_)));
    }

    #[test]
    fn tiny_canvas_still_composes_without_qr() {
        let spec = PhysicalCanvasSpec::new(0.1, 0.1, 100);
        let canvas = compose(
            &product("Approved"),
            LayoutMode::Vertical,
            &ThemePalette::LIGHT,
            &spec,
            &TagAssets::none(),
        )
        .unwrap();
        assert_eq!((canvas.width(), canvas.height()), (10, 10));
        assert!(canvas.geometry().qr_rect().is_empty());

        let canvas = compose(
            &product("Approved"),
            LayoutMode::Horizontal,
            &ThemePalette::DARK,
            &spec,
            &TagAssets::none(),
        )
        .unwrap();
        assert_eq!((canvas.width(), canvas.height()), (10, 10));
    }

    #[test]
    fn status_value_comes_from_record() {
        let p = product("Prototype");
        assert_eq!(field_value(&p, TagField::QcStatus), "Prototype");
        assert_eq!(p.qc_status, QcStatus::Prototype);
        assert_eq!(field_value(&p, TagField::MadeIn), "Japan");
    }
}
