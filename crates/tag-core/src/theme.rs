//! Fixed colour palettes for tags.

use image::Rgba;

/// Named theme preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Industrial,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Industrial];

    /// Case-insensitive lookup; unknown names fall back to `Light`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "dark" => Self::Dark,
            "industrial" => Self::Industrial,
            other => {
                tracing::warn!(theme = other, "Unknown theme, falling back to Light");
                Self::Light
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::Industrial => "Industrial",
        }
    }

    pub fn palette(&self) -> ThemePalette {
        match self {
            Self::Light => ThemePalette::LIGHT,
            Self::Dark => ThemePalette::DARK,
            Self::Industrial => ThemePalette::INDUSTRIAL,
        }
    }
}

/// The five colours a tag is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: Rgba<u8>,
    pub text: Rgba<u8>,
    pub muted_text: Rgba<u8>,
    pub separator: Rgba<u8>,
    pub frame: Rgba<u8>,
}

impl ThemePalette {
    pub const LIGHT: Self = Self {
        background: Rgba([0xff, 0xff, 0xff, 255]),
        text: Rgba([0x08, 0x38, 0x38, 255]),
        muted_text: Rgba([0x6b, 0x74, 0x78, 255]),
        separator: Rgba([0, 0, 0, 30]),
        frame: Rgba([8, 56, 56, 150]),
    };

    pub const DARK: Self = Self {
        background: Rgba([0x1a, 0x23, 0x32, 255]),
        text: Rgba([0xe8, 0xee, 0xf7, 255]),
        muted_text: Rgba([0xdc, 0xe4, 0xf0, 255]),
        separator: Rgba([255, 255, 255, 30]),
        frame: Rgba([255, 255, 255, 120]),
    };

    // Same ink as Light; kept separate so the preset can diverge.
    pub const INDUSTRIAL: Self = Self {
        background: Rgba([0xff, 0xff, 0xff, 255]),
        text: Rgba([0x08, 0x38, 0x38, 255]),
        muted_text: Rgba([0x6b, 0x74, 0x78, 255]),
        separator: Rgba([0, 0, 0, 30]),
        frame: Rgba([8, 56, 56, 150]),
    };
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::LIGHT
    }
}
