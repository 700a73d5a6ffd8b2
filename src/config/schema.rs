//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::collect::{
    CollectorSettings, DEFAULT_EXCLUDED_NAMESPACE_PREFIXES, DEFAULT_MAX_CONCURRENT_QUERIES,
    ExclusionPolicy,
};
use crate::correlate::{
    CorrelationPolicy, DEFAULT_EXCLUDED_CONFIG_MAP_PREFIXES, DEFAULT_EXCLUDED_SECRET_PREFIXES,
    DEFAULT_LIST_DELIMITER, SiblingAttachment,
};
use crate::models::UNAVAILABLE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespaces starting with any of these prefixes are not inventoried
    #[serde(default = "default_excluded_namespace_prefixes")]
    pub excluded_namespace_prefixes: Vec<String>,

    /// Secrets starting with any of these prefixes are left out of rows
    #[serde(default = "default_excluded_secret_prefixes")]
    pub excluded_secret_prefixes: Vec<String>,

    /// ConfigMaps starting with any of these prefixes are left out of rows
    #[serde(default = "default_excluded_config_map_prefixes")]
    pub excluded_config_map_prefixes: Vec<String>,

    /// Value written into cells a row has no data for
    #[serde(default = "default_marker")]
    pub not_applicable_marker: String,

    /// Separator for multi-valued cells
    #[serde(default = "default_delimiter")]
    pub list_delimiter: String,

    /// Which workload rows carry quota, volume, secret and configmap columns
    #[serde(default)]
    pub sibling_attachment: SiblingAttachment,

    /// Directory the CSV and JSON reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Skip TLS certificate verification against the API server
    #[serde(default = "default_false")]
    pub insecure_skip_tls_verify: bool,

    /// Collector tuning
    #[serde(default)]
    pub collector: CollectorConfig,
}

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Upper bound on in-flight list requests
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,

    /// Items requested per list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Query metrics.k8s.io for pod CPU and memory usage
    #[serde(default = "default_true")]
    pub collect_metrics: bool,
}

// Default value functions
fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_excluded_namespace_prefixes() -> Vec<String> {
    to_strings(DEFAULT_EXCLUDED_NAMESPACE_PREFIXES)
}

fn default_excluded_secret_prefixes() -> Vec<String> {
    to_strings(DEFAULT_EXCLUDED_SECRET_PREFIXES)
}

fn default_excluded_config_map_prefixes() -> Vec<String> {
    to_strings(DEFAULT_EXCLUDED_CONFIG_MAP_PREFIXES)
}

fn default_marker() -> String {
    UNAVAILABLE.to_string()
}

fn default_delimiter() -> String {
    DEFAULT_LIST_DELIMITER.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_max_concurrent_queries() -> usize {
    DEFAULT_MAX_CONCURRENT_QUERIES
}

fn default_page_size() -> u32 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_namespace_prefixes: default_excluded_namespace_prefixes(),
            excluded_secret_prefixes: default_excluded_secret_prefixes(),
            excluded_config_map_prefixes: default_excluded_config_map_prefixes(),
            not_applicable_marker: default_marker(),
            list_delimiter: default_delimiter(),
            sibling_attachment: SiblingAttachment::default(),
            output_dir: default_output_dir(),
            insecure_skip_tls_verify: default_false(),
            collector: CollectorConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: default_max_concurrent_queries(),
            page_size: default_page_size(),
            collect_metrics: default_true(),
        }
    }
}

impl Config {
    pub fn correlation_policy(&self) -> CorrelationPolicy {
        CorrelationPolicy {
            excluded_secret_prefixes: self.excluded_secret_prefixes.clone(),
            excluded_config_map_prefixes: self.excluded_config_map_prefixes.clone(),
            attachment: self.sibling_attachment,
            delimiter: self.list_delimiter.clone(),
            marker: self.not_applicable_marker.clone(),
        }
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            max_concurrent_queries: self.collector.max_concurrent_queries,
            collect_metrics: self.collector.collect_metrics,
            exclusion: ExclusionPolicy::new(self.excluded_namespace_prefixes.iter().cloned()),
            correlation: self.correlation_policy(),
        }
    }
}
