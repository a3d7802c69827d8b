//! Abstract 2D drawing surface and its `RgbaImage` implementation.
//!
//! Layout code draws exclusively through [`DrawSurface`], so the tag
//! compositor never depends on a concrete raster backend. Shape fills are
//! evaluated at pixel centres without anti-aliasing, which keeps output
//! byte-for-byte reproducible.

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::compose::{self, blend_pixel};
use crate::text;

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Centre point, rounded down.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - 2 * dx,
            self.height - 2 * dy,
        )
    }
}

/// Horizontal text alignment inside a cell; text is always vertically centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Font, pixel size and colour for one piece of text.
#[derive(Clone, Copy)]
pub struct TextStyle<'a> {
    pub font: &'a FontVec,
    pub size_px: f32,
    pub color: Rgba<u8>,
}

/// Drawing capability the tag compositor is written against.
pub trait DrawSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Blend a solid rectangle onto the surface.
    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>);

    /// Blend a solid rounded rectangle onto the surface.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: u32, color: Rgba<u8>);

    /// Blend a rounded rectangle outline. `rect` is the outer edge and the
    /// stroke grows inwards by `stroke` pixels.
    ///
    /// Callers that want the stroke centred on a path grow the rect by half
    /// the stroke first.
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: u32, stroke: u32, color: Rgba<u8>);

    /// Blend a solid ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect, color: Rgba<u8>);

    /// Draw single-line text inside `rect`, truncated to the rect width.
    fn draw_text(&mut self, rect: Rect, text: &str, style: &TextStyle<'_>, align: TextAlign);

    /// Copy an image onto the surface, replacing destination pixels.
    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32);

    /// Alpha-composite an image onto the surface.
    fn composite_image(&mut self, image: &RgbaImage, x: i32, y: i32);
}

/// [`DrawSurface`] backed by an in-memory RGBA buffer.
#[derive(Debug, Clone)]
pub struct RgbaSurface {
    image: RgbaImage,
}

impl RgbaSurface {
    /// Create a surface filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Blend `color` into every pixel of `bounds` whose centre passes `inside`.
    fn blend_where(&mut self, bounds: Rect, color: Rgba<u8>, inside: impl Fn(f32, f32) -> bool) {
        let x0 = bounds.x.max(0);
        let y0 = bounds.y.max(0);
        let x1 = bounds.right().min(self.image.width() as i32);
        let y1 = bounds.bottom().min(self.image.height() as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                if inside(px as f32 + 0.5, py as f32 + 0.5) {
                    let dst = self.image.get_pixel(px as u32, py as u32);
                    let out = blend_pixel(dst, &color);
                    self.image.put_pixel(px as u32, py as u32, out);
                }
            }
        }
    }
}

/// Whether point (`px`, `py`) lies inside the rounded rectangle.
fn in_rounded_rect(rect: &Rect, radius: f32, px: f32, py: f32) -> bool {
    let (x0, y0) = (rect.x as f32, rect.y as f32);
    let (x1, y1) = (rect.right() as f32, rect.bottom() as f32);
    if px < x0 || px > x1 || py < y0 || py > y1 {
        return false;
    }
    let r = radius
        .min(rect.width as f32 / 2.0)
        .min(rect.height as f32 / 2.0)
        .max(0.0);
    let cx = px.clamp(x0 + r, x1 - r);
    let cy = py.clamp(y0 + r, y1 - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

impl DrawSurface for RgbaSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        if rect.is_empty() {
            return;
        }
        self.blend_where(rect, color, |_, _| true);
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: u32, color: Rgba<u8>) {
        if rect.is_empty() {
            return;
        }
        let r = radius as f32;
        self.blend_where(rect, color, |px, py| in_rounded_rect(&rect, r, px, py));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: u32, stroke: u32, color: Rgba<u8>) {
        if rect.is_empty() || stroke == 0 {
            return;
        }
        let s = stroke as i32;
        let inner = rect.inset(s, s);
        let outer_r = radius as f32;
        let inner_r = radius.saturating_sub(stroke) as f32;
        self.blend_where(rect, color, |px, py| {
            in_rounded_rect(&rect, outer_r, px, py)
                && (inner.is_empty() || !in_rounded_rect(&inner, inner_r, px, py))
        });
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Rgba<u8>) {
        if rect.is_empty() {
            return;
        }
        let rx = rect.width as f32 / 2.0;
        let ry = rect.height as f32 / 2.0;
        let cx = rect.x as f32 + rx;
        let cy = rect.y as f32 + ry;
        self.blend_where(rect, color, |px, py| {
            let nx = (px - cx) / rx;
            let ny = (py - cy) / ry;
            nx * nx + ny * ny <= 1.0
        });
    }

    fn draw_text(&mut self, rect: Rect, content: &str, style: &TextStyle<'_>, align: TextAlign) {
        if rect.is_empty() || content.is_empty() || style.size_px <= 0.0 {
            return;
        }
        let scale = PxScale::from(style.size_px);
        let fitted = text::fit_text(style.font, scale, content, rect.width as u32);
        if fitted.is_empty() {
            return;
        }
        let text_w = text::measure_text_width(style.font, scale, &fitted) as i32;
        let text_h = text::text_height(style.font, scale) as i32;
        let x = match align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + (rect.width - text_w) / 2,
        };
        let y = rect.y + (rect.height - text_h) / 2;
        draw_text_mut(&mut self.image, style.color, x, y, scale, style.font, &fitted);
    }

    fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32) {
        compose::paste(&mut self.image, image, x, y);
    }

    fn composite_image(&mut self, image: &RgbaImage, x: i32, y: i32) {
        compose::overlay(&mut self.image, image, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn rect_inset_shrinks_both_sides() {
        let r = Rect::new(10, 20, 100, 50).inset(5, 10);
        assert_eq!(r, Rect::new(15, 30, 90, 30));
        assert_eq!(r.right(), 105);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn fill_rect_is_clipped_to_surface() {
        let mut s = RgbaSurface::new(10, 10, WHITE);
        s.fill_rect(Rect::new(-5, -5, 8, 8), RED);
        assert_eq!(s.image().get_pixel(2, 2), &RED);
        assert_eq!(s.image().get_pixel(3, 3), &WHITE);
    }

    #[test]
    fn rounded_rect_leaves_corners_untouched() {
        let mut s = RgbaSurface::new(40, 40, WHITE);
        s.fill_rounded_rect(Rect::new(0, 0, 40, 40), 12, RED);
        assert_eq!(s.image().get_pixel(0, 0), &WHITE);
        assert_eq!(s.image().get_pixel(20, 20), &RED);
        assert_eq!(s.image().get_pixel(20, 0), &RED);
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut s = RgbaSurface::new(60, 40, WHITE);
        s.stroke_rounded_rect(Rect::new(0, 0, 60, 40), 12, 3, RED);
        assert_eq!(s.image().get_pixel(30, 1), &RED);
        assert_eq!(s.image().get_pixel(1, 20), &RED);
        assert_eq!(s.image().get_pixel(30, 20), &WHITE);
        assert_eq!(s.image().get_pixel(30, 4), &WHITE);
    }

    #[test]
    fn stroke_stays_inside_rect() {
        let mut s = RgbaSurface::new(30, 30, WHITE);
        s.stroke_rounded_rect(Rect::new(5, 5, 20, 20), 0, 4, RED);
        assert_eq!(s.image().get_pixel(4, 15), &WHITE);
        assert_eq!(s.image().get_pixel(5, 15), &RED);
        assert_eq!(s.image().get_pixel(8, 15), &RED);
        assert_eq!(s.image().get_pixel(9, 15), &WHITE);
        assert_eq!(s.image().get_pixel(24, 15), &RED);
        assert_eq!(s.image().get_pixel(25, 15), &WHITE);
    }

    #[test]
    fn ellipse_centre_is_filled_corners_are_not() {
        let mut s = RgbaSurface::new(20, 20, WHITE);
        s.fill_ellipse(Rect::new(0, 0, 20, 20), RED);
        assert_eq!(s.image().get_pixel(10, 10), &RED);
        assert_eq!(s.image().get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut s = RgbaSurface::new(4, 4, WHITE);
        s.fill_rect(Rect::new(0, 0, 4, 4), Rgba([0, 0, 0, 30]));
        let px = s.image().get_pixel(1, 1);
        assert_eq!(px[3], 255);
        assert!(px[0] < 255 && px[0] > 200);
    }

    #[test]
    fn draw_image_replaces_and_composite_blends() {
        let mut s = RgbaSurface::new(4, 4, WHITE);
        let clear = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        s.composite_image(&clear, 0, 0);
        assert_eq!(s.image().get_pixel(0, 0), &WHITE);
        s.draw_image(&clear, 0, 0);
        assert_eq!(s.image().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }
}
