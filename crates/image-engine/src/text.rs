//! Text measurement utilities.
//!
//! Measures single-line text and fits it into a fixed-width cell.

use ab_glyph::{Font, PxScale, ScaleFont};

/// Logical resolution raster painters use to convert point sizes.
pub const LOGICAL_DPI: f32 = 96.0;

/// Convert a font point size to a pixel scale at [`LOGICAL_DPI`].
pub fn points_to_px(points: f32) -> f32 {
    points * LOGICAL_DPI / 72.0
}

/// Measure the pixel width of a string at the given font and scale.
pub fn measure_text_width<F: Font>(font: &F, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width.ceil() as u32
}

/// Height of one line of text (ascent to descent) for the given font and scale.
pub fn text_height<F: Font>(font: &F, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent()).ceil() as u32
}

/// Truncate `text` so it fits within `max_width` pixels.
///
/// Returns the longest prefix (by characters) whose measured width fits.
pub fn fit_text<F: Font>(font: &F, scale: PxScale, text: &str, max_width: u32) -> String {
    if measure_text_width(font, scale, text) <= max_width {
        return text.to_string();
    }

    let mut fitted = String::new();
    for ch in text.chars() {
        fitted.push(ch);
        if measure_text_width(font, scale, &fitted) > max_width {
            fitted.pop();
            break;
        }
    }
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_at_logical_dpi() {
        assert_eq!(points_to_px(72.0), 96.0);
        assert_eq!(points_to_px(12.0), 16.0);
    }

    #[test]
    fn system_font_measurements_are_consistent() {
        // Hosts without any system font skip this check.
        let fonts = crate::FontSet::load_system();
        let Some(font) = fonts.sans() else {
            return;
        };
        let scale = PxScale::from(32.0);
        let short = measure_text_width(font, scale, "PN");
        let long = measure_text_width(font, scale, "PN-12345");
        assert!(long > short);
        assert!(text_height(font, scale) > 0);

        let fitted = fit_text(font, scale, "PN-12345", short);
        assert!(measure_text_width(font, scale, &fitted) <= short);
        assert!("PN-12345".starts_with(&fitted));
    }
}
