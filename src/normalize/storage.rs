//! Quota, storage, secret and configmap kinds

use super::{ParseError, array_or_empty, base, lookup, object_or_empty, string_or_unavailable};
use crate::models::{NormalizedResource, RawResource, UNAVAILABLE};

pub(super) fn quota(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    Ok(resource.with("limits", object_or_empty(&raw.body, &["spec", "hard"])))
}

/// Persistent volumes are cluster-scoped; they belong to the namespace of
/// the claim they are bound to
pub(super) fn volume(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let mut resource = base(raw)?;
    let body = &raw.body;

    let bound_namespace = lookup(body, &["spec", "claimRef", "namespace"])
        .and_then(|v| v.as_str())
        .unwrap_or(UNAVAILABLE)
        .to_string();
    resource.namespace = bound_namespace.clone();

    Ok(resource
        .with("capacity", string_or_unavailable(body, &["spec", "capacity", "storage"]))
        .with("access_modes", array_or_empty(body, &["spec", "accessModes"]))
        .with(
            "reclaim_policy",
            string_or_unavailable(body, &["spec", "persistentVolumeReclaimPolicy"]),
        )
        .with("bound_namespace", bound_namespace)
        .with("claim_name", string_or_unavailable(body, &["spec", "claimRef", "name"])))
}

/// Claims report their bound status, falling back to the requested spec
pub(super) fn claim(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    let body = &raw.body;

    let access_modes = match lookup(body, &["status", "accessModes"]) {
        Some(modes) if modes.is_array() => modes.clone(),
        _ => array_or_empty(body, &["spec", "accessModes"]),
    };

    Ok(resource
        .with("volume_name", string_or_unavailable(body, &["spec", "volumeName"]))
        .with("access_modes", access_modes)
        .with(
            "capacity",
            string_or_unavailable(body, &["status", "capacity", "storage"]),
        ))
}

pub(super) fn secret(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    let resource = base(raw)?;
    Ok(resource.with("type", string_or_unavailable(&raw.body, &["type"])))
}

pub(super) fn config_map(raw: &RawResource) -> Result<NormalizedResource, ParseError> {
    base(raw)
}
