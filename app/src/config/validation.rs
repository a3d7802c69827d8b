//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use tag_core::ExportFormat;

static RE_OUTPUT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[,xX]\s*(\d+(?:\.\d+)?)\s*$").unwrap()
});

/// Largest accepted tag side, in inches.
const MAX_SIDE_INCHES: f64 = 48.0;

/// Parse a `"w,h"` (or `"wxh"`) pair of inches.
pub fn parse_output_size(value: &str) -> Option<(f64, f64)> {
    let caps = RE_OUTPUT_SIZE.captures(value)?;
    let w: f64 = caps[1].parse().ok()?;
    let h: f64 = caps[2].parse().ok()?;
    Some((w, h))
}

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "TAG_OUTPUT_SIZE" => {
            let (w, h) = parse_output_size(value).ok_or("must be two numbers, e.g. '4,3'")?;
            for side in [w, h] {
                if !(side > 0.0 && side <= MAX_SIDE_INCHES) {
                    return Err(format!("sides must be between 0 and {MAX_SIDE_INCHES} inches"));
                }
            }
        }
        "TAG_DPI" => validate_int_range(value, 72, 2400)?,
        "TAG_DEFAULT_FORMAT" => {
            if ExportFormat::parse(value).is_none() {
                return Err("must be png, jpg, jpeg or pdf".into());
            }
        }
        "TAG_LAYOUT" => {
            if !["vertical", "horizontal"].contains(&value.trim().to_ascii_lowercase().as_str()) {
                return Err("must be 'Vertical' or 'Horizontal'".into());
            }
        }
        "TAG_THEME" => {
            if !["light", "dark", "industrial"].contains(&value.trim().to_ascii_lowercase().as_str()) {
                return Err("must be Light, Dark, or Industrial".into());
            }
        }
        k if is_path_setting(k) => {
            if value.trim().is_empty() {
                return Err("path must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_path_setting(key: &str) -> bool {
    matches!(
        key,
        "TAG_OUTPUT_FOLDER"
            | "TAG_LOGO_PATH"
            | "TAG_QR_LOGO_PATH"
            | "TAG_LABEL_FONT"
            | "TAG_VALUE_FONT"
    )
}
