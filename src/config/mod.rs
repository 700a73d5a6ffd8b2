//! Configuration system for kube-inventory
//!
//! Built-in defaults, overlaid by the YAML config file, overlaid by
//! environment variables. Command-line flags are applied last by the binary.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{CollectorConfig, Config};

use anyhow::Context;

/// Every key accepted by `get_config_value` and `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "excludedNamespacePrefixes",
    "excludedSecretPrefixes",
    "excludedConfigMapPrefixes",
    "notApplicableMarker",
    "listDelimiter",
    "siblingAttachment",
    "outputDir",
    "insecureSkipTlsVerify",
    "collector.maxConcurrentQueries",
    "collector.pageSize",
    "collector.collectMetrics",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "excludedNamespacePrefixes" => Ok(config.excluded_namespace_prefixes.join(",")),
        "excludedSecretPrefixes" => Ok(config.excluded_secret_prefixes.join(",")),
        "excludedConfigMapPrefixes" => Ok(config.excluded_config_map_prefixes.join(",")),
        "notApplicableMarker" => Ok(config.not_applicable_marker.clone()),
        "listDelimiter" => Ok(config.list_delimiter.clone()),
        "siblingAttachment" => Ok(config.sibling_attachment.to_string()),
        "outputDir" => Ok(config.output_dir.display().to_string()),
        "insecureSkipTlsVerify" => Ok(config.insecure_skip_tls_verify.to_string()),
        "collector.maxConcurrentQueries" => Ok(config.collector.max_concurrent_queries.to_string()),
        "collector.pageSize" => Ok(config.collector.page_size.to_string()),
        "collector.collectMetrics" => Ok(config.collector.collect_metrics.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Parse a prefix list given as a YAML array or a comma-separated list
fn parse_list(key: &str, value: &str) -> anyhow::Result<Vec<String>> {
    if value.trim_start().starts_with('[') {
        serde_yaml::from_str(value)
            .with_context(|| format!("{} must be a YAML array (e.g., ['a-', 'b-'])", key))
    } else {
        Ok(loader::split_list(value))
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "excludedNamespacePrefixes" => {
            config.excluded_namespace_prefixes = parse_list(key, value)?;
        }
        "excludedSecretPrefixes" => {
            config.excluded_secret_prefixes = parse_list(key, value)?;
        }
        "excludedConfigMapPrefixes" => {
            config.excluded_config_map_prefixes = parse_list(key, value)?;
        }
        "notApplicableMarker" => {
            if value.is_empty() {
                return Err(anyhow::anyhow!("notApplicableMarker must not be empty"));
            }
            config.not_applicable_marker = value.to_string();
        }
        "listDelimiter" => {
            if value.is_empty() {
                return Err(anyhow::anyhow!("listDelimiter must not be empty"));
            }
            config.list_delimiter = value.to_string();
        }
        "siblingAttachment" => {
            config.sibling_attachment = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        "outputDir" => {
            config.output_dir = value.into();
        }
        "insecureSkipTlsVerify" => {
            config.insecure_skip_tls_verify = value
                .parse()
                .context("insecureSkipTlsVerify must be 'true' or 'false'")?;
        }
        "collector.maxConcurrentQueries" => {
            let limit: usize = value
                .parse()
                .context("collector.maxConcurrentQueries must be a number")?;
            if limit == 0 {
                return Err(anyhow::anyhow!(
                    "collector.maxConcurrentQueries must be at least 1"
                ));
            }
            config.collector.max_concurrent_queries = limit;
        }
        "collector.pageSize" => {
            let size: u32 = value
                .parse()
                .context("collector.pageSize must be a number")?;
            if size == 0 {
                return Err(anyhow::anyhow!("collector.pageSize must be at least 1"));
            }
            config.collector.page_size = size;
        }
        "collector.collectMetrics" => {
            config.collector.collect_metrics = value
                .parse()
                .context("collector.collectMetrics must be 'true' or 'false'")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
