//! Byte-level encoders for finished tag rasters.
//!
//! PNG and JPEG outputs carry DPI metadata so print software reproduces
//! the physical size; PDF output is a single page sized in points with the
//! raster embedded full-bleed.

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Pt, Px,
};
use tracing::debug;

use crate::compose::blend_pixel;
use crate::{EngineError, POINTS_PER_INCH, Result};

/// Default JPEG quality used for tag exports.
pub const JPEG_QUALITY: u8 = 95;

const INCHES_PER_METER: f64 = 39.370_078_740_157_48;

/// Convert dots per inch to the pixels-per-metre unit PNG `pHYs` uses.
pub fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) * INCHES_PER_METER).round() as u32
}

/// Convert PNG pixels-per-metre back to dots per inch.
pub fn pixels_per_meter_to_dpi(ppm: u32) -> u32 {
    (f64::from(ppm) / INCHES_PER_METER).round() as u32
}

/// Page size in PDF points for a physical size in inches.
pub fn page_size_points(width_in: f32, height_in: f32) -> (f32, f32) {
    (width_in * POINTS_PER_INCH, height_in * POINTS_PER_INCH)
}

/// Composite every pixel over an opaque `background`, dropping alpha.
pub fn flatten_alpha(image: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let bg = Rgba([background[0], background[1], background[2], 255]);
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let out = if px[3] == 255 { *px } else { blend_pixel(&bg, px) };
        Rgb([out[0], out[1], out[2]])
    })
}

/// Encode as 8-bit RGBA PNG with a `pHYs` chunk for `dpi`.
pub fn encode_png(image: &RgbaImage, dpi: u32) -> Result<Vec<u8>> {
    check_dimensions(image)?;
    let ppm = dpi_to_pixels_per_meter(dpi);
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    debug!(bytes = buf.len(), dpi, "Encoded PNG");
    Ok(buf)
}

/// Encode as 8-bit RGB JPEG at `quality` with a JFIF density of `dpi`.
///
/// Alpha is flattened onto white first so no transparency leaks through.
pub fn encode_jpeg(image: &RgbaImage, dpi: u32, quality: u8) -> Result<Vec<u8>> {
    check_dimensions(image)?;
    let rgb = flatten_alpha(image, Rgb([255, 255, 255]));
    let density = u16::try_from(dpi).unwrap_or(u16::MAX);

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.set_pixel_density(PixelDensity::dpi(density));
    encoder.encode_image(&rgb)?;
    debug!(bytes = buf.len(), dpi, quality, "Encoded JPEG");
    Ok(buf)
}

/// Encode as a single-page PDF measuring `width_in`×`height_in` inches.
///
/// The raster is scaled to fill the page while preserving its aspect
/// ratio, centred, with no margins.
pub fn encode_pdf(image: &RgbaImage, width_in: f32, height_in: f32, title: &str) -> Result<Vec<u8>> {
    check_dimensions(image)?;
    if !(width_in > 0.0 && height_in > 0.0) {
        return Err(EngineError::Pdf(format!(
            "invalid page size {width_in}x{height_in} in"
        )));
    }

    let (page_w, page_h) = page_size_points(width_in, height_in);
    let (img_w, img_h) = (image.width() as f32, image.height() as f32);
    let scale = (page_w / img_w).min(page_h / img_h);
    let offset_x = (page_w - img_w * scale) / 2.0;
    let offset_y = (page_h - img_h * scale) / 2.0;

    let (doc, page, layer) =
        PdfDocument::new(title, Mm::from(Pt(page_w)), Mm::from(Pt(page_h)), "Tag");
    let layer = doc.get_page(page).get_layer(layer);

    let rgb = flatten_alpha(image, Rgb([255, 255, 255]));
    let xobject = ImageXObject {
        width: Px(image.width() as usize),
        height: Px(image.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: rgb.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    };

    // One image pixel spans `scale` points, i.e. 72 / scale pixels per inch.
    Image::from(xobject).add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm::from(Pt(offset_x))),
            translate_y: Some(Mm::from(Pt(offset_y))),
            dpi: Some(POINTS_PER_INCH / scale),
            ..Default::default()
        },
    );

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| EngineError::Pdf(e.to_string()))?;
    debug!(bytes = bytes.len(), page_w, page_h, "Encoded PDF");
    Ok(bytes)
}

fn check_dimensions(image: &RgbaImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EngineError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90, 255])
        })
    }

    #[test]
    fn dpi_conversion_round_trips() {
        for dpi in [72, 96, 150, 300, 600, 1200] {
            assert_eq!(pixels_per_meter_to_dpi(dpi_to_pixels_per_meter(dpi)), dpi);
        }
        assert_eq!(dpi_to_pixels_per_meter(600), 23622);
    }

    #[test]
    fn page_size_is_72_points_per_inch() {
        assert_eq!(page_size_points(4.0, 3.0), (288.0, 216.0));
    }

    #[test]
    fn png_is_lossless_and_carries_dpi() {
        let img = sample(31, 17);
        let bytes = encode_png(&img, 600).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);

        let reader = png::Decoder::new(Cursor::new(&bytes)).read_info().unwrap();
        let dims = reader.info().pixel_dims.expect("pHYs chunk missing");
        assert_eq!(dims.unit, png::Unit::Meter);
        assert_eq!(pixels_per_meter_to_dpi(dims.xppu), 600);
        assert_eq!(pixels_per_meter_to_dpi(dims.yppu), 600);
    }

    #[test]
    fn jpeg_is_rgb_with_expected_size() {
        let img = sample(40, 30);
        let bytes = encode_jpeg(&img, 300, JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn jpeg_jfif_header_records_dpi() {
        let bytes = encode_jpeg(&sample(8, 8), 300, JPEG_QUALITY).unwrap();
        // APP0 "JFIF\0", version, units=1 (dpi), Xdensity, Ydensity
        let pos = bytes
            .windows(5)
            .position(|w| w == b"JFIF\0")
            .expect("JFIF segment missing");
        assert_eq!(bytes[pos + 7], 1);
        assert_eq!(u16::from_be_bytes([bytes[pos + 8], bytes[pos + 9]]), 300);
        assert_eq!(u16::from_be_bytes([bytes[pos + 10], bytes[pos + 11]]), 300);
    }

    #[test]
    fn flatten_alpha_composites_over_background() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten_alpha(&img, Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn pdf_starts_with_header() {
        let bytes = encode_pdf(&sample(40, 30), 4.0, 3.0, "Tag").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            encode_png(&img, 300),
            Err(EngineError::InvalidDimensions { .. })
        ));
    }
}
