//! Alpha blending and image overlay.

use image::{Rgba, RgbaImage};

/// Overlay `top` onto `base` with its top-left corner at (`x`, `y`).
///
/// The `top` image is alpha-composited over the base. Pixels falling
/// outside the base (including negative offsets) are skipped.
pub fn overlay(base: &mut RgbaImage, top: &RgbaImage, x: i32, y: i32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let Some((tx, ty)) = target(base, x, y, dx, dy) else {
            continue;
        };
        let alpha = pixel[3];
        if alpha == 255 {
            base.put_pixel(tx, ty, *pixel);
        } else if alpha > 0 {
            let blended = blend_pixel(base.get_pixel(tx, ty), pixel);
            base.put_pixel(tx, ty, blended);
        }
    }
}

/// Copy `top` onto `base` without blending, replacing destination pixels.
pub fn paste(base: &mut RgbaImage, top: &RgbaImage, x: i32, y: i32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        if let Some((tx, ty)) = target(base, x, y, dx, dy) {
            base.put_pixel(tx, ty, *pixel);
        }
    }
}

fn target(base: &RgbaImage, x: i32, y: i32, dx: u32, dy: u32) -> Option<(u32, u32)> {
    let tx = i64::from(x) + i64::from(dx);
    let ty = i64::from(y) + i64::from(dy);
    if tx < 0 || ty < 0 || tx >= i64::from(base.width()) || ty >= i64::from(base.height()) {
        return None;
    }
    Some((tx as u32, ty as u32))
}

/// Source-over blend of `fg` onto `bg`.
pub fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(fg[3]) / 255.0;
    if sa <= 0.0 {
        return *bg;
    }
    let da = f32::from(bg[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let c = (f32::from(fg[i]) * sa + f32::from(bg[i]) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
