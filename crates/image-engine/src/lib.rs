//! Raster primitives for printable tag images.
//!
//! Provides an abstract drawing surface with an `RgbaImage` backend,
//! alpha compositing, aspect-preserving resizing, font discovery and text
//! fitting, high error-correction QR rendering with a centre logo, and
//! PNG/JPEG/PDF encoders that carry physical print size.

pub mod compose;
pub mod export;
pub mod font;
pub mod qr;
pub mod resize;
pub mod surface;
pub mod text;

// Re-exports for convenience
pub use export::{encode_jpeg, encode_pdf, encode_png, flatten_alpha};
pub use font::FontSet;
pub use qr::generate_qr;
pub use resize::{fit_dimensions, fit_within, shrink_to_fit};
pub use surface::{DrawSurface, Rect, RgbaSurface, TextAlign, TextStyle};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Errors that can occur while rendering or encoding images.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("QR payload of {len} bytes exceeds the maximum symbol capacity")]
    QrDataTooLong { len: usize },

    #[error("QR encode error: {0}")]
    QrEncode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid font data: {0}")]
    Font(String),

    #[error("PNG encode error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("JPEG encode error: {0}")]
    Jpeg(#[from] image::ImageError),

    #[error("PDF encode error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for image-engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
