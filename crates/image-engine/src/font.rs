//! Font discovery for tag rendering.
//!
//! Loads a proportional font for labels and a monospace font for values,
//! from explicit paths first and well-known system locations second.

use std::path::Path;

use ab_glyph::FontVec;

use crate::{EngineError, Result};

/// Fonts used while composing a tag. Either face may be absent.
#[derive(Default)]
pub struct FontSet {
    sans: Option<FontVec>,
    mono: Option<FontVec>,
}

impl FontSet {
    /// A font set with no faces; text drawing is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(sans: Option<FontVec>, mono: Option<FontVec>) -> Self {
        Self { sans, mono }
    }

    /// Discover fonts from system font directories.
    pub fn load_system() -> Self {
        Self::load(None, None)
    }

    /// Load fonts from explicit paths, falling back to system fonts for
    /// any face that is not given or cannot be parsed.
    pub fn load(sans_path: Option<&Path>, mono_path: Option<&Path>) -> Self {
        let sans = sans_path
            .and_then(load_logged)
            .or_else(|| first_loadable(sans_candidates()));
        let mono = mono_path
            .and_then(load_logged)
            .or_else(|| first_loadable(mono_candidates()));

        if sans.is_none() {
            tracing::warn!("No usable label font found, tag text will not be drawn");
        }
        Self { sans, mono }
    }

    /// Proportional face for labels and placeholders.
    pub fn sans(&self) -> Option<&FontVec> {
        self.sans.as_ref().or(self.mono.as_ref())
    }

    /// Monospace face for values; falls back to the label face.
    pub fn mono(&self) -> Option<&FontVec> {
        self.mono.as_ref().or(self.sans.as_ref())
    }
}

/// Read and parse a TTF/OTF font file.
pub fn load_font_file(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data)
        .map_err(|_| EngineError::Font(format!("failed to parse {} (TTF/OTF)", path.display())))
}

fn load_logged(path: &Path) -> Option<FontVec> {
    match load_font_file(path) {
        Ok(font) => {
            tracing::info!(path = %path.display(), "Using configured font");
            Some(font)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring configured font: {e}");
            None
        }
    }
}

fn first_loadable(candidates: &[&str]) -> Option<FontVec> {
    for path in candidates {
        if let Ok(font) = load_font_file(Path::new(path)) {
            tracing::debug!(path = %path, "Using system font");
            return Some(font);
        }
    }
    None
}

fn sans_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Helvetica.ttf",
            "/Library/Fonts/Arial.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\segoeui.ttf", "C:\\Windows\\Fonts\\arial.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ]
    }
}

fn mono_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Courier New.ttf",
            "/Library/Fonts/Courier New.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\consola.ttf", "C:\\Windows\\Fonts\\cour.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_no_faces() {
        let fonts = FontSet::empty();
        assert!(fonts.sans().is_none());
        assert!(fonts.mono().is_none());
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let err = load_font_file(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn garbage_font_data_is_rejected() {
        let dir = std::env::temp_dir().join("image-engine-font-test.ttf");
        std::fs::write(&dir, b"not a font").unwrap();
        let err = load_font_file(&dir).unwrap_err();
        assert!(matches!(err, EngineError::Font(_)));
        let _ = std::fs::remove_file(&dir);
    }
}
