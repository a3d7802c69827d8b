//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use tag_core::{ExportFormat, LayoutMode, PhysicalCanvasSpec, RenderOptions, Theme};

use super::validation::{parse_output_size, validate_setting};

/// Runtime configuration with defaults for every setting.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub output_inches: (f64, f64),
    pub dpi: u32,
    pub default_format: ExportFormat,
    pub output_folder: PathBuf,
    pub layout: LayoutMode,
    pub theme: Theme,
    pub logo_path: PathBuf,
    pub qr_logo_path: PathBuf,
    pub label_font: Option<PathBuf>,
    pub value_font: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_inches: (4.0, 3.0),
            dpi: 600,
            default_format: ExportFormat::Pdf,
            output_folder: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            layout: LayoutMode::Vertical,
            theme: Theme::Light,
            logo_path: PathBuf::from("kii_logo.png"),
            qr_logo_path: PathBuf::from("kiiqr.png"),
            label_font: None,
            value_font: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Invalid values are logged and
    /// the default kept.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            match validate_setting(key, &value) {
                Ok(()) => Some(value.trim().to_string()),
                Err(e) => {
                    tracing::warn!("Ignoring {key}={value:?}: {e}");
                    None
                }
            }
        };

        let mut config = Self::default();
        if let Some(size) = g("TAG_OUTPUT_SIZE").as_deref().and_then(parse_output_size) {
            config.output_inches = size;
        }
        if let Some(dpi) = g("TAG_DPI").and_then(|v| v.parse().ok()) {
            config.dpi = dpi;
        }
        if let Some(format) = g("TAG_DEFAULT_FORMAT").as_deref().and_then(ExportFormat::parse) {
            config.default_format = format;
        }
        if let Some(folder) = g("TAG_OUTPUT_FOLDER") {
            config.output_folder = PathBuf::from(folder);
        }
        if let Some(layout) = g("TAG_LAYOUT") {
            config.layout = LayoutMode::from_name(&layout);
        }
        if let Some(theme) = g("TAG_THEME") {
            config.theme = Theme::from_name(&theme);
        }
        if let Some(path) = g("TAG_LOGO_PATH") {
            config.logo_path = PathBuf::from(path);
        }
        if let Some(path) = g("TAG_QR_LOGO_PATH") {
            config.qr_logo_path = PathBuf::from(path);
        }
        config.label_font = g("TAG_LABEL_FONT").map(PathBuf::from);
        config.value_font = g("TAG_VALUE_FONT").map(PathBuf::from);
        config
    }

    pub fn canvas_spec(&self) -> PhysicalCanvasSpec {
        PhysicalCanvasSpec::new(self.output_inches.0, self.output_inches.1, self.dpi)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            layout: self.layout,
            theme: self.theme,
            canvas: self.canvas_spec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_from(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]);
        assert_eq!(config.output_inches, (4.0, 3.0));
        assert_eq!(config.dpi, 600);
        assert_eq!(config.default_format, ExportFormat::Pdf);
        assert_eq!(config.layout, LayoutMode::Vertical);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.logo_path, PathBuf::from("kii_logo.png"));
        assert_eq!(config.qr_logo_path, PathBuf::from("kiiqr.png"));
        assert!(config.label_font.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("TAG_OUTPUT_SIZE", "2.5,1.5"),
            ("TAG_DPI", "300"),
            ("TAG_DEFAULT_FORMAT", "jpg"),
            ("TAG_OUTPUT_FOLDER", "/tmp/tags"),
            ("TAG_LAYOUT", "horizontal"),
            ("TAG_THEME", "Dark"),
            ("TAG_VALUE_FONT", "/fonts/mono.ttf"),
        ]);
        assert_eq!(config.canvas_spec(), PhysicalCanvasSpec::new(2.5, 1.5, 300));
        assert_eq!(config.default_format, ExportFormat::Jpeg);
        assert_eq!(config.output_folder, PathBuf::from("/tmp/tags"));
        assert_eq!(config.render_options().layout, LayoutMode::Horizontal);
        assert_eq!(config.render_options().theme, Theme::Dark);
        assert_eq!(config.value_font, Some(PathBuf::from("/fonts/mono.ttf")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[
            ("TAG_OUTPUT_SIZE", "big"),
            ("TAG_DPI", "5"),
            ("TAG_DEFAULT_FORMAT", "gif"),
            ("TAG_THEME", "neon"),
        ]);
        assert_eq!(config.output_inches, (4.0, 3.0));
        assert_eq!(config.dpi, 600);
        assert_eq!(config.default_format, ExportFormat::Pdf);
        assert_eq!(config.theme, Theme::Light);
    }
}
