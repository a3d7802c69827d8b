use image::{DynamicImage, RgbaImage};

use crate::{LayoutMode, PhysicalCanvasSpec, ProductRecord, TagAssets, TagCanvas, ThemePalette, compose};

fn sample_product() -> ProductRecord {
    ProductRecord::new(
        "Widget Pro",
        "PN-1001",
        "Approved",
        "Japan",
        "https://example.com/catalog/pn-1001",
    )
}

fn render(product: &ProductRecord, layout: LayoutMode, spec: PhysicalCanvasSpec, assets: &TagAssets) -> TagCanvas {
    compose(product, layout, &ThemePalette::LIGHT, &spec, assets).expect("compose failed")
}

/// Decode the first QR symbol found in `img`.
fn decode_qr(img: &RgbaImage) -> String {
    let luma = DynamicImage::ImageRgba8(img.clone()).to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        luma.width() as usize,
        luma.height() as usize,
        |x, y| luma.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    assert!(!grids.is_empty(), "no QR grid detected");
    let (_, content) = grids[0].decode().expect("QR decode failed");
    content
}
