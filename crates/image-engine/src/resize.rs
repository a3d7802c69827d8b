//! Aspect-ratio-preserving resize operations.
//!
//! `fit_within` scales up or down to the largest size that fits a box,
//! `shrink_to_fit` only ever scales down (thumbnail semantics).

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Largest `(width, height)` with the aspect ratio of `width`×`height` that
/// fits inside `max_width`×`max_height`.
///
/// Uses integer arithmetic so results are reproducible across platforms.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let (mw, mh) = (u64::from(max_width), u64::from(max_height));

    let scaled_w = mh * w / h;
    if scaled_w <= mw {
        (scaled_w as u32, max_height)
    } else {
        (max_width, (mw * h / w) as u32)
    }
}

/// Resize an image to fit inside the given box while maintaining aspect ratio.
///
/// Returns `None` when the box (or the fitted size) is degenerate.
pub fn fit_within(
    img: &DynamicImage,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> Option<RgbaImage> {
    let (orig_w, orig_h) = (img.width(), img.height());
    let (new_w, new_h) = fit_dimensions(orig_w, orig_h, max_width, max_height);
    if new_w == 0 || new_h == 0 {
        debug!(orig_w, orig_h, max_width, max_height, "Fitted size is empty, skipping image");
        return None;
    }

    if (new_w, new_h) == (orig_w, orig_h) {
        debug!(new_w, new_h, "Image already at target size, skipping resize");
        return Some(img.to_rgba8());
    }

    debug!(orig_w, orig_h, new_w, new_h, "Resizing image to fit box");
    Some(img.resize_exact(new_w, new_h, filter).to_rgba8())
}

/// Shrink an image so its larger dimension is at most `max_side`.
///
/// Images already small enough are returned unchanged.
pub fn shrink_to_fit(img: &DynamicImage, max_side: u32) -> Option<RgbaImage> {
    if max_side == 0 {
        return None;
    }
    if img.width() <= max_side && img.height() <= max_side {
        return Some(img.to_rgba8());
    }
    fit_within(img, max_side, max_side, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Create a test DynamicImage with given dimensions.
    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let gray = GrayImage::from_pixel(width, height, Luma([128]));
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn test_fit_dimensions_width_bound() {
        assert_eq!(fit_dimensions(800, 400, 200, 200), (200, 100));
    }

    #[test]
    fn test_fit_dimensions_height_bound() {
        assert_eq!(fit_dimensions(400, 800, 200, 200), (100, 200));
    }

    #[test]
    fn test_fit_dimensions_square_into_wide_box() {
        assert_eq!(fit_dimensions(2400, 2400, 406, 257), (257, 257));
    }

    #[test]
    fn test_fit_within_upscale() {
        let img = create_test_image(100, 50);
        let result = fit_within(&img, 400, 400, FilterType::Triangle).unwrap();
        assert_eq!(result.dimensions(), (400, 200));
    }

    #[test]
    fn test_fit_within_degenerate_box() {
        let img = create_test_image(100, 50);
        assert!(fit_within(&img, 0, 100, FilterType::Triangle).is_none());
    }

    #[test]
    fn test_shrink_to_fit_never_enlarges() {
        let img = create_test_image(40, 20);
        let result = shrink_to_fit(&img, 100).unwrap();
        assert_eq!(result.dimensions(), (40, 20));
    }

    #[test]
    fn test_shrink_to_fit_downscale() {
        let img = create_test_image(1000, 500);
        let result = shrink_to_fit(&img, 100).unwrap();
        assert_eq!(result.dimensions(), (100, 50));
    }

    #[test]
    fn test_shrink_to_fit_collapsed_side_is_none() {
        // Very wide, very short image
        let img = create_test_image(1000, 1);
        assert!(shrink_to_fit(&img, 10).is_none());
    }
}
