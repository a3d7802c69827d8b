pub mod assets;
pub mod config;
pub mod report;

use config::AppConfig;

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load .env and the runtime configuration.
pub fn init_config() -> AppConfig {
    load_dotenv();
    let config = AppConfig::load();
    tracing::info!(
        "Settings loaded (size={}x{} in, dpi={}, format={}, layout={}, theme={})",
        config.output_inches.0,
        config.output_inches.1,
        config.dpi,
        config.default_format,
        config.layout.name(),
        config.theme.name()
    );
    config
}
