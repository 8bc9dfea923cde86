//! Motion configuration loading for the command line

use anyhow::{Context, Result};
use glide_chatlist::MotionConfig;
use std::path::Path;

/// Load `path`, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<MotionConfig> {
    match path {
        Some(path) => MotionConfig::load(path)
            .with_context(|| format!("Failed to load motion config from {}", path.display())),
        None => Ok(MotionConfig::default()),
    }
}

/// The default configuration as a commented TOML document
pub fn default_config_toml() -> Result<String> {
    let body = MotionConfig::default()
        .to_toml()
        .context("Failed to serialize default motion config")?;
    Ok(format!(
        "# Glide motion configuration\n# Durations are in seconds, distances in points.\n\n{body}"
    ))
}
