mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = ["./formshift.toml", "~/.config/formshift/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.batch.capacity == 0 {
        anyhow::bail!("Batch capacity cannot be 0");
    }

    if config.sidecar.suffix.trim().is_empty() {
        anyhow::bail!("Sidecar suffix cannot be empty");
    }

    if config.pdf.default_dpi == 0 {
        anyhow::bail!("Default DPI cannot be 0");
    }

    for tool in formshift_av::Tool::ALL {
        if let Some(path) = config.tools.configured(tool) {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", tool.binary(), path);
            }
        }
    }

    Ok(())
}
