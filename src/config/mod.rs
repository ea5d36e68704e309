mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./reelmatch.toml",
        "./config.toml",
        "~/.config/reelmatch/config.toml",
        "/etc/reelmatch/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.scan.concurrency == 0 {
        anyhow::bail!("scan.concurrency cannot be 0");
    }
    if config.scan.retry_attempts == 0 {
        anyhow::bail!("scan.retry_attempts cannot be 0");
    }

    if config.plex.token.is_empty() {
        tracing::warn!("No Plex token configured; scanning will fail until [plex] token is set");
    }
    if config.providers.tvdb.api_key.is_empty() {
        tracing::warn!(
            "No TVDb API key configured; episodes will not resolve to keyword lookups"
        );
    }

    Ok(())
}
