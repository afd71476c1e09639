//! Configuration management for the projection compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (projections.toml)
//! - Environment variables (PROJECTIONS__*)
//!
//! ## Example config file (projections.toml):
//! ```toml
//! [compiler]
//! method_prefix = "get"
//! extra_scalar_types = ["Money", "EmailAddress"]
//! suggest_fields = true
//!
//! [declarations]
//! path = "./declarations"
//! skip_prefixes = ["target/", "drafts/"]
//! include_prefixes = ["orders/"]
//!
//! [output]
//! format = "pretty"
//! include_schema = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::LoadConfig;
use crate::projection::DEFAULT_METHOD_PREFIX;

/// Main configuration for the projection compiler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Declaration discovery settings
    #[serde(default)]
    pub declarations: DeclarationsConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Prefix of convention-derived computation method names
    #[serde(default = "default_method_prefix")]
    pub method_prefix: String,

    /// Host types to classify as scalar in addition to the built-in set
    #[serde(default)]
    pub extra_scalar_types: Vec<String>,

    /// Attach "did you mean" suggestions to unknown-field diagnostics
    #[serde(default = "default_true")]
    pub suggest_fields: bool,
}

/// Declaration discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationsConfig {
    /// Directory holding declaration documents
    #[serde(default = "default_declarations_path")]
    pub path: PathBuf,

    /// Relative path prefixes to skip while walking
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// When non-empty, only load files below these relative prefixes
    #[serde(default)]
    pub include_prefixes: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the schema registry alongside the projections
    #[serde(default = "default_true")]
    pub include_schema: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_method_prefix() -> String {
    DEFAULT_METHOD_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_declarations_path() -> PathBuf {
    PathBuf::from("declarations")
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            method_prefix: default_method_prefix(),
            extra_scalar_types: Vec::new(),
            suggest_fields: true,
        }
    }
}

impl Default for DeclarationsConfig {
    fn default() -> Self {
        Self {
            path: default_declarations_path(),
            skip_prefixes: default_skip_prefixes(),
            include_prefixes: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            include_schema: true,
        }
    }
}

impl ProjectionConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "projections.toml",
            ".projections.toml",
            "config/projections.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "projections") {
            let xdg_config = config_dir.config_dir().join("projections.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (PROJECTIONS__COMPILER__METHOD_PREFIX, ...)
        builder = builder.add_source(
            Environment::with_prefix("PROJECTIONS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Loader settings derived from the `[declarations]` section
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            skip_prefixes: self.declarations.skip_prefixes.clone(),
            include_prefixes: self.declarations.include_prefixes.clone(),
        }
    }
}
