use std::path::Path;

use anyhow::Context;
use engage_core::EngagementConfig;

/// Parse and validate an engagement config from TOML text.
///
/// Keys left out of the document keep their defaults.
pub fn parse_config(raw: &str) -> anyhow::Result<EngagementConfig> {
    let config: EngagementConfig = toml::from_str(raw).context("parse engagement config")?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, or the built-in defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngagementConfig> {
    let Some(path) = path else {
        return Ok(EngagementConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("load config file {}", path.display()))
}
