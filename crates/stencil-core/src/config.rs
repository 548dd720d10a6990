//! Configuration parsing
//!
//! This module handles loading the Stencil project configuration file.
//!
//! # Configuration Files
//!
//! - `stencil.yaml` - Project root configuration
//!
//! Every field has a default, so an empty file (or no file at all, via
//! [`Config::load_or_default`]) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "stencil.yaml";

/// Root project configuration from `stencil.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,

    /// Template compiler settings
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Source transform settings
    #[serde(default)]
    pub transforms: TransformsConfig,
}

/// Template compiler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding `.hbs` templates, relative to the project root
    #[serde(default = "default_template_dir")]
    pub dir: String,

    /// Maximum number of compiled templates kept in memory
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,

    /// Fail on unresolved placeholders instead of leaving them verbatim
    #[serde(default)]
    pub strict: bool,

    /// HTML-escape interpolated values
    #[serde(default)]
    pub escape_html: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            max_cache_size: default_max_cache_size(),
            strict: false,
            escape_html: false,
        }
    }
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_max_cache_size() -> usize {
    100
}

/// Source transform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformsConfig {
    /// Name of the class-merging helper whose arguments are reordered
    #[serde(default = "default_target_fn")]
    pub target_fn: String,

    /// File extensions visited when transforming a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for TransformsConfig {
    fn default() -> Self {
        Self {
            target_fn: default_target_fn(),
            extensions: default_extensions(),
        }
    }
}

fn default_target_fn() -> String {
    "cn".to_string()
}

fn default_extensions() -> Vec<String> {
    ["tsx", "jsx", "ts", "js"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Base path of the project
    pub base_path: PathBuf,
}

impl Config {
    /// Load configuration from a directory
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the project directory or stencil.yaml file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-project")?;
    /// println!("Templates: {}", config.template_dir().display());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (config_path, base_path) = split_config_path(path.as_ref());

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project: ProjectConfig = if contents.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        tracing::debug!("Loaded configuration from {}", config_path.display());
        Ok(Self { project, base_path })
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Err(Error::ConfigNotFound { path: missing }) => {
                tracing::debug!("No configuration at {}, using defaults", missing);
                let (_, base_path) = split_config_path(path.as_ref());
                Ok(Self {
                    project: ProjectConfig::default(),
                    base_path,
                })
            }
            other => other,
        }
    }

    /// Absolute-or-relative path of the template directory
    pub fn template_dir(&self) -> PathBuf {
        self.base_path.join(&self.project.templates.dir)
    }
}

fn split_config_path(path: &Path) -> (PathBuf, PathBuf) {
    if path.is_dir() {
        (path.join(CONFIG_FILE_NAME), path.to_path_buf())
    } else {
        (
            path.to_path_buf(),
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        )
    }
}
