//! Workload, pod and networking kinds

use super::{
    ParseError, array_or_empty, base, lookup, number_or_unavailable, object_or_empty,
    string_or_unavailable,
};
use crate::models::{NormalizedResource, RawResource};
use serde_json::Value;

/// Namespace annotation carrying the default node selector on OpenShift
pub const NODE_SELECTOR_ANNOTATION: &str = "openshift.io/node-selector";

pub(super) fn namespace(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let mut resource = base(raw)?;
    // The namespace of a Namespace is itself
    resource.namespace = resource.name.clone();

    let selector = lookup(&raw.body, &["metadata", "annotations", NODE_SELECTOR_ANNOTATION])
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty());

    Ok(match selector {
        Some(selector) => resource.with("node_selector", selector),
        None => resource,
    })
}

/// Pods are summarized by their first container only
pub(super) fn pod(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    let body = &raw.body;

    let container = lookup(body, &["spec", "containers"])
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| ParseError::Malformed {
            kind: raw.kind,
            name: resource.name.clone(),
            reason: "pod has no containers".to_string(),
        })?;

    Ok(resource
        .with("node_name", string_or_unavailable(body, &["spec", "nodeName"]))
        .with("image", string_or_unavailable(container, &["image"]))
        .with("resources", object_or_empty(container, &["resources"]))
        .with("readiness_probe", object_or_empty(container, &["readinessProbe"]))
        .with("liveness_probe", object_or_empty(container, &["livenessProbe"]))
        .with("phase", string_or_unavailable(body, &["status", "phase"])))
}

/// Deployment, DeploymentConfig and StatefulSet share one shape
pub(super) fn workload(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    Ok(resource
        .with("replicas", number_or_unavailable(&raw.body, &["spec", "replicas"]))
        .with("labels", object_or_empty(&raw.body, &["metadata", "labels"])))
}

pub(super) fn service(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    Ok(resource
        .with("type", string_or_unavailable(&raw.body, &["spec", "type"]))
        .with("cluster_ip", string_or_unavailable(&raw.body, &["spec", "clusterIP"]))
        .with("ports", array_or_empty(&raw.body, &["spec", "ports"])))
}

pub(super) fn route(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    Ok(resource
        .with("host", string_or_unavailable(&raw.body, &["spec", "host"]))
        .with(
            "target_service",
            string_or_unavailable(&raw.body, &["spec", "to", "name"]),
        ))
}

pub(super) fn autoscaler(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    let body = &raw.body;

    // minReplicas defaults to 1 in the API
    let min_replicas = lookup(body, &["spec", "minReplicas"])
        .filter(|v| v.is_number())
        .cloned()
        .unwrap_or(Value::from(1));

    Ok(resource
        .with("min_replicas", min_replicas)
        .with("max_replicas", number_or_unavailable(body, &["spec", "maxReplicas"]))
        .with(
            "current_cpu_utilization",
            number_or_unavailable(body, &["status", "currentCPUUtilizationPercentage"]),
        )
        .with(
            "target_name",
            string_or_unavailable(body, &["spec", "scaleTargetRef", "name"]),
        ))
}
