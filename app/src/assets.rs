//! Logo and font discovery.
//!
//! Relative asset paths are looked up in the working directory, its
//! `resources/` folder, then next to the executable.

use std::path::{Path, PathBuf};

use image_engine::FontSet;
use tag_core::TagAssets;

use crate::config::AppConfig;

/// Resolve `name` against the well-known asset locations.
pub fn find_asset(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let mut roots = vec![PathBuf::from("."), PathBuf::from("resources")];
    if let Some(dir) = exe_dir {
        roots.push(dir.join("resources"));
        roots.push(dir);
    }
    find_in(&roots, name)
}

fn find_in(roots: &[PathBuf], name: &Path) -> Option<PathBuf> {
    roots.iter().map(|root| root.join(name)).find(|p| p.is_file())
}

/// Load logos and fonts named by `config`. Anything missing is left out.
pub fn load_assets(config: &AppConfig) -> TagAssets {
    let logo = find_asset(&config.logo_path);
    let qr_logo = find_asset(&config.qr_logo_path);
    match &logo {
        Some(path) => tracing::info!("Using logo {}", path.display()),
        None => tracing::info!(
            "Logo {} not found, drawing placeholder",
            config.logo_path.display()
        ),
    }
    if qr_logo.is_none() {
        tracing::debug!("QR logo {} not found", config.qr_logo_path.display());
    }

    let fonts = FontSet::load(config.label_font.as_deref(), config.value_font.as_deref());
    TagAssets::load(logo.as_deref(), qr_logo.as_deref(), fonts)
}
