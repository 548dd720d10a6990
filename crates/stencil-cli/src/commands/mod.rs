//! CLI command implementations

pub mod fmt_templates;
pub mod precompile;
pub mod render;
pub mod transform;

use std::path::PathBuf;

use anyhow::{Context, Result};
use stencil_core::Config;

/// Load the project configuration, using defaults when the file is absent
pub fn load_config(config_path: &str) -> Result<Config> {
    tracing::debug!("Loading configuration from {}", config_path);
    Config::load_or_default(config_path).context("Failed to load configuration")
}

/// Directory argument, or the configured template directory
pub fn template_dir(config: &Config, dir: Option<&str>) -> PathBuf {
    dir.map(PathBuf::from)
        .unwrap_or_else(|| config.template_dir())
}
