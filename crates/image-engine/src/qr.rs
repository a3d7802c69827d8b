//! QR code generation for printable tags.
//!
//! Symbols always use error-correction level H so a centre logo can cover
//! part of the modules without breaking scannability.

use image::{DynamicImage, Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::resize;
use crate::surface::{DrawSurface, Rect, RgbaSurface};
use crate::{EngineError, Result};

/// Quiet-zone width in modules on every side of the symbol.
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Default fraction of the QR width a centre logo may occupy.
pub const DEFAULT_LOGO_SCALE: f32 = 0.18;

/// Opacity of the white backing drawn behind a centre logo.
const LOGO_BACKING_ALPHA: u8 = 235;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Generate a square QR image of exactly `target_px`×`target_px` pixels.
///
/// The smallest symbol version that fits `data` at level H is chosen.
/// Modules are scaled with nearest-neighbour sampling so edges stay crisp.
/// When `center_logo` is given it is shrunk to at most
/// `logo_scale × target_px` on its larger side and composited in the
/// centre over a translucent white rounded backing.
pub fn generate_qr(
    data: &str,
    target_px: u32,
    center_logo: Option<&DynamicImage>,
    logo_scale: f32,
) -> Result<RgbaImage> {
    if target_px == 0 {
        return Err(EngineError::InvalidDimensions {
            width: target_px,
            height: target_px,
        });
    }

    let code =
        QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H).map_err(|e| match e {
            QrError::DataTooLong => EngineError::QrDataTooLong { len: data.len() },
            other => EngineError::QrEncode(other.to_string()),
        })?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let total = module_count + 2 * QUIET_ZONE_MODULES;

    debug!(
        version = ?code.version(),
        module_count,
        target_px,
        "Rendering QR symbol"
    );

    // Output pixel -> module coordinate (including quiet zone).
    let axis: Vec<Option<u32>> = (0..target_px)
        .map(|p| {
            let m = (u64::from(p) * u64::from(total) / u64::from(target_px)) as u32;
            m.checked_sub(QUIET_ZONE_MODULES)
                .filter(|&inner| inner < module_count)
        })
        .collect();

    let mut img = RgbaImage::from_pixel(target_px, target_px, LIGHT);
    for (y, my) in axis.iter().enumerate() {
        let Some(my) = my else { continue };
        for (x, mx) in axis.iter().enumerate() {
            let Some(mx) = mx else { continue };
            let idx = (*my * module_count + *mx) as usize;
            if modules[idx] == qrcode::Color::Dark {
                img.put_pixel(x as u32, y as u32, DARK);
            }
        }
    }

    match center_logo {
        Some(logo) => Ok(overlay_center_logo(img, logo, logo_scale)),
        None => Ok(img),
    }
}

fn overlay_center_logo(img: RgbaImage, logo: &DynamicImage, logo_scale: f32) -> RgbaImage {
    let size = img.width();
    let max_side = (size as f32 * logo_scale) as u32;
    let Some(logo) = resize::shrink_to_fit(logo, max_side) else {
        debug!(max_side, "Centre logo collapses to nothing, skipping");
        return img;
    };

    let (lw, lh) = (logo.width() as i32, logo.height() as i32);
    let lx = (size as i32 - lw) / 2;
    let ly = (size as i32 - lh) / 2;
    let pad = 6.max(lw / 10);
    let radius = 8.max(pad / 2) as u32;

    let mut surface = RgbaSurface::from_image(img);
    surface.fill_rounded_rect(
        Rect::new(lx - pad, ly - pad, lw + 2 * pad, lh + 2 * pad),
        radius,
        Rgba([255, 255, 255, LOGO_BACKING_ALPHA]),
    );
    surface.composite_image(&logo, lx, ly);
    surface.into_image()
}
