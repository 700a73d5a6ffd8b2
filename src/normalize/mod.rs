//! Kind normalizer
//!
//! One pure function per resource kind turns a [`RawResource`] into a
//! [`NormalizedResource`]. Missing optional paths are defaulted (empty mapping,
//! empty sequence or the "unavailable" sentinel) so that a sparse record never
//! fails as a whole. Only records without a name, or whose shape makes the
//! kind meaningless (a pod without containers), are rejected.

mod metrics;
mod storage;
mod workloads;

pub use metrics::{format_cpu, format_memory, parse_cpu_millicores, parse_memory_bytes};

use crate::models::{NormalizedResource, RawResource, ResourceKind, UNAVAILABLE};
use serde_json::{Map, Value};

/// A single record that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{kind} record has no metadata.name")]
    MissingName { kind: ResourceKind },

    #[error("{kind} {name} is malformed: {reason}")]
    Malformed {
        kind: ResourceKind,
        name: String,
        reason: String,
    },
}

impl ParseError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ParseError::MissingName { kind } | ParseError::Malformed { kind, .. } => *kind,
        }
    }
}

/// Normalize one raw record according to its kind
pub fn normalize(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    if !raw.body.is_object() {
        return Err(ParseError::Malformed {
            kind: raw.kind,
            name: raw.name().unwrap_or(UNAVAILABLE).to_string(),
            reason: "record is not an object".to_string(),
        });
    }

    match raw.kind {
        ResourceKind::Namespace => workloads::namespace(raw),
        ResourceKind::Pod => workloads::pod(raw),
        ResourceKind::Deployment | ResourceKind::DeploymentConfig | ResourceKind::StatefulSet => {
            workloads::workload(raw)
        }
        ResourceKind::Service => workloads::service(raw),
        ResourceKind::Route => workloads::route(raw),
        ResourceKind::HorizontalPodAutoscaler => workloads::autoscaler(raw),
        ResourceKind::ResourceQuota => storage::quota(raw),
        ResourceKind::PersistentVolume => storage::volume(raw),
        ResourceKind::PersistentVolumeClaim => storage::claim(raw),
        ResourceKind::Secret => storage::secret(raw),
        ResourceKind::ConfigMap => storage::config_map(raw),
        ResourceKind::PodMetrics => metrics::pod_metrics(raw),
    }
}

/// Normalize a batch, dropping malformed records instead of failing
pub fn normalize_batch(raws: Vec<RawResource>) -> (Vec<NormalizedResource>, Vec<ParseError>) {
    let mut normalized = Vec::with_capacity(raws.len());
    let mut errors = Vec::new();

    for raw in &raws {
        match normalize(raw) {
            Ok(resource) => normalized.push(resource),
            Err(e) => {
                tracing::warn!(
                    kind = %raw.kind,
                    namespace = raw.namespace.as_deref().unwrap_or(""),
                    "Dropping record: {}",
                    e
                );
                errors.push(e);
            }
        }
    }

    (normalized, errors)
}

/// Walk a nested path of object keys
pub(crate) fn lookup<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(obj, |current, key| current.get(*key))
}

/// Start a normalized record from the raw record's metadata
///
/// The namespace comes from `metadata.namespace`, falling back to the
/// namespace the query ran in, then to the sentinel for cluster-scoped kinds.
pub(crate) fn base(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let name = raw
        .name()
        .filter(|n| !n.is_empty())
        .ok_or(ParseError::MissingName { kind: raw.kind })?;

    let namespace = lookup(&raw.body, &["metadata", "namespace"])
        .and_then(|n| n.as_str())
        .or(raw.namespace.as_deref())
        .unwrap_or(UNAVAILABLE);

    Ok(NormalizedResource::new(raw.kind, namespace, name))
}

/// String at `path`, or the sentinel
pub(crate) fn string_or_unavailable(obj: &Value, path: &[&str]) -> Value {
    match lookup(obj, path) {
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(Value::Number(n)) => Value::String(n.to_string()),
        _ => Value::String(UNAVAILABLE.to_string()),
    }
}

/// Number at `path`, or the sentinel
pub(crate) fn number_or_unavailable(obj: &Value, path: &[&str]) -> Value {
    match lookup(obj, path) {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        _ => Value::String(UNAVAILABLE.to_string()),
    }
}

/// Mapping at `path`, or an empty mapping
pub(crate) fn object_or_empty(obj: &Value, path: &[&str]) -> Value {
    match lookup(obj, path) {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    }
}

/// Sequence at `path`, or an empty sequence
pub(crate) fn array_or_empty(obj: &Value, path: &[&str]) -> Value {
    match lookup(obj, path) {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(kind: ResourceKind, body: Value) -> RawResource {
        RawResource::new(kind, Some("payments".to_string()), body)
    }

    #[test]
    fn test_lookup_nested() {
        let obj = json!({"spec": {"claimRef": {"namespace": "payments"}}});
        assert_eq!(
            lookup(&obj, &["spec", "claimRef", "namespace"]),
            Some(&json!("payments"))
        );
        assert_eq!(lookup(&obj, &["spec", "missing", "namespace"]), None);
    }

    #[test]
    fn test_base_falls_back_to_query_namespace() {
        let resource = base(&raw(
            ResourceKind::Secret,
            json!({"metadata": {"name": "api-creds"}}),
        ))
        .unwrap();
        assert_eq!(resource.namespace, "payments");
        assert_eq!(resource.name, "api-creds");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = normalize(&raw(ResourceKind::ConfigMap, json!({"metadata": {}}))).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingName {
                kind: ResourceKind::ConfigMap
            }
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = normalize(&raw(ResourceKind::Service, json!("nope"))).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
        assert_eq!(err.kind(), ResourceKind::Service);
    }

    #[test]
    fn test_batch_drops_only_malformed_records() {
        let raws = vec![
            raw(ResourceKind::Pod, json!({"metadata": {"name": "api-1"}, "spec": {}})),
            raw(
                ResourceKind::Pod,
                json!({
                    "metadata": {"name": "api-2"},
                    "spec": {"containers": [{"image": "app:1.0"}]}
                }),
            ),
            raw(ResourceKind::Pod, json!({"spec": {"containers": []}})),
        ];

        let (normalized, errors) = normalize_batch(raws);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].name, "api-2");
        assert_eq!(errors.len(), 2);
    }
}
