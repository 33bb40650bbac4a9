//! Race configuration file loading

use anyhow::{bail, Context, Result};
use race_log_engine::RaceConfig;
use std::fs;
use std::path::Path;

/// On-disk encodings of the race configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything unknown is JSON
    fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load and validate a race configuration from a JSON or TOML file
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let format = ConfigFormat::detect(path);
    log::debug!("Parsing {:?} as {:?}", path, format);

    let config: RaceConfig = match format {
        ConfigFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?,
        ConfigFormat::Toml => toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?,
    };

    if let Err(e) = config.validate() {
        bail!("Invalid config file {:?}: {}", path, e);
    }

    Ok(config)
}
