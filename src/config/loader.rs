//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the root config file
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            Self::load_defaults()
        };
        Self::apply_env_overrides(config)
    }

    /// Load configuration from a file
    ///
    /// Keys missing from the file take their built-in defaults.
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // An empty file is a valid, all-defaults config
        if contents.trim().is_empty() {
            return Ok(Self::load_defaults());
        }

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This performs strict validation - it will fail on:
    /// - Invalid YAML syntax
    /// - Invalid value types
    /// - Values the collector cannot run with
    /// - File read errors
    pub fn validate() -> Result<()> {
        let config = Self::load().context("Failed to load configuration")?;
        Self::check(&config)
    }

    /// Check semantic constraints serde cannot express
    pub fn check(config: &Config) -> Result<()> {
        if config.collector.max_concurrent_queries == 0 {
            return Err(anyhow::anyhow!(
                "collector.maxConcurrentQueries must be at least 1"
            ));
        }
        if config.collector.page_size == 0 {
            return Err(anyhow::anyhow!("collector.pageSize must be at least 1"));
        }
        if config.list_delimiter.is_empty() {
            return Err(anyhow::anyhow!("listDelimiter must not be empty"));
        }
        if config.not_applicable_marker.is_empty() {
            return Err(anyhow::anyhow!("notApplicableMarker must not be empty"));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Result<Config> {
        // KUBE_INVENTORY_OUTPUT_DIR override
        if let Ok(dir) = std::env::var("KUBE_INVENTORY_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                config.output_dir = PathBuf::from(dir);
            }
        }

        // KUBE_INVENTORY_MAX_CONCURRENT_QUERIES override
        if let Ok(limit) = std::env::var("KUBE_INVENTORY_MAX_CONCURRENT_QUERIES") {
            config.collector.max_concurrent_queries = limit.trim().parse().with_context(|| {
                format!(
                    "KUBE_INVENTORY_MAX_CONCURRENT_QUERIES must be a number, got '{}'",
                    limit
                )
            })?;
        }

        // KUBE_INVENTORY_EXCLUDED_NAMESPACE_PREFIXES override (comma-separated)
        if let Ok(prefixes) = std::env::var("KUBE_INVENTORY_EXCLUDED_NAMESPACE_PREFIXES") {
            config.excluded_namespace_prefixes = split_list(&prefixes);
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Split a comma-separated list, dropping blanks
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
