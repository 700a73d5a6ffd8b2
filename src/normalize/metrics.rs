//! Pod metrics (`metrics.k8s.io` PodMetrics)
//!
//! Container usage is summed per pod and rendered the way `kubectl top pod`
//! prints it: CPU in millicores, memory in MiB.

use super::{ParseError, base, lookup};
use crate::models::{NormalizedResource, RawResource, UNAVAILABLE};

pub(super) fn pod_metrics(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;

    let containers = lookup(&raw.body, &["containers"])
        .and_then(|c| c.as_array())
        .map(|c| c.as_slice())
        .unwrap_or_default();

    let cpu: Option<f64> = containers
        .iter()
        .filter_map(|c| lookup(c, &["usage", "cpu"]).and_then(|v| v.as_str()))
        .filter_map(parse_cpu_millicores)
        .fold(None, |acc, m| Some(acc.unwrap_or(0.0) + m));

    let memory: Option<f64> = containers
        .iter()
        .filter_map(|c| lookup(c, &["usage", "memory"]).and_then(|v| v.as_str()))
        .filter_map(parse_memory_bytes)
        .fold(None, |acc, b| Some(acc.unwrap_or(0.0) + b));

    Ok(resource
        .with(
            "cpu",
            cpu.map(format_cpu).unwrap_or_else(|| UNAVAILABLE.to_string()),
        )
        .with(
            "memory",
            memory
                .map(format_memory)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        ))
}

/// Split a quantity into its numeric part and suffix
fn split_quantity(quantity: &str) -> Option<(f64, &str)> {
    let quantity = quantity.trim();
    let split = quantity
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(quantity.len());
    let (number, suffix) = quantity.split_at(split);
    let number: f64 = number.parse().ok()?;
    if number.is_sign_negative() {
        return None;
    }
    Some((number, suffix))
}

/// Parse a CPU quantity (`250m`, `1`, `2534123n`) into millicores
pub fn parse_cpu_millicores(quantity: &str) -> Option<f64> {
    let (number, suffix) = split_quantity(quantity)?;
    match suffix {
        "" => Some(number * 1_000.0),
        "m" => Some(number),
        "u" => Some(number / 1e3),
        "n" => Some(number / 1e6),
        "k" => Some(number * 1e6),
        _ => None,
    }
}

/// Parse a memory quantity (`45Mi`, `1Gi`, `512k`, `1048576`) into bytes
pub fn parse_memory_bytes(quantity: &str) -> Option<f64> {
    let (number, suffix) = split_quantity(quantity)?;
    let factor: f64 = match suffix {
        "" => 1.0,
        "Ki" => 1024.0,
        "Mi" => 1024.0_f64.powi(2),
        "Gi" => 1024.0_f64.powi(3),
        "Ti" => 1024.0_f64.powi(4),
        "Pi" => 1024.0_f64.powi(5),
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        _ => return None,
    };
    Some(number * factor)
}

/// Millicores rounded up, as `kubectl top` does
pub fn format_cpu(millicores: f64) -> String {
    format!("{}m", millicores.ceil() as u64)
}

pub fn format_memory(bytes: f64) -> String {
    format!("{}Mi", (bytes / 1024.0_f64.powi(2)).floor() as u64)
}
