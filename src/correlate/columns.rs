//! Column writers shared by workload rows and standalone rows
//!
//! Every writer takes a slice of resources of one kind and flattens it into
//! row columns. Names, images and access modes collapse into sorted sets;
//! per-resource values stay as parallel lists aligned with the slice order.

use super::CorrelationPolicy;
use crate::models::{InventoryRow, NormalizedResource, UNAVAILABLE, render_value};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Attribute as a row cell, with the sentinel mapped to the configured marker
fn cell(resource: &NormalizedResource, key: &str, policy: &CorrelationPolicy) -> Value {
    match resource.attr(key) {
        None => Value::String(policy.marker.clone()),
        Some(Value::String(s)) if s == UNAVAILABLE => Value::String(policy.marker.clone()),
        Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => v.clone(),
        Some(other) => Value::String(other.to_string()),
    }
}

/// Parallel list: one entry per value, a lone value keeps its own type
fn join_cells(values: Vec<Value>, policy: &CorrelationPolicy) -> Value {
    if values.len() == 1 {
        return values.into_iter().next().unwrap_or(Value::Null);
    }
    Value::String(
        values
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(&policy.delimiter),
    )
}

/// Deduplicated, sorted list; None when nothing is known
fn join_set<'a>(
    values: impl Iterator<Item = &'a str>,
    policy: &CorrelationPolicy,
) -> Option<Value> {
    let set: BTreeSet<&str> = values.filter(|v| *v != UNAVAILABLE).collect();
    if set.is_empty() {
        return None;
    }
    Some(Value::String(
        set.into_iter().collect::<Vec<_>>().join(&policy.delimiter),
    ))
}

/// Nested values as compact JSON; several values become a JSON array
fn json_values<'a>(values: impl Iterator<Item = &'a Value>, distinct: bool) -> Value {
    let mut rendered: Vec<String> = Vec::new();
    for value in values {
        let text = value.to_string();
        if !distinct || !rendered.contains(&text) {
            rendered.push(text);
        }
    }
    match rendered.len() {
        1 => Value::String(rendered.remove(0)),
        _ => Value::String(format!("[{}]", rendered.join(","))),
    }
}

fn names(resources: &[&NormalizedResource], policy: &CorrelationPolicy) -> Value {
    Value::String(
        resources
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(&policy.delimiter),
    )
}

fn parallel(resources: &[&NormalizedResource], key: &str, policy: &CorrelationPolicy) -> Value {
    join_cells(resources.iter().map(|r| cell(r, key, policy)).collect(), policy)
}

/// Union of string arrays such as access modes
fn array_set(
    resources: &[&NormalizedResource],
    key: &str,
    policy: &CorrelationPolicy,
) -> Option<Value> {
    join_set(
        resources
            .iter()
            .filter_map(|r| r.attr(key).and_then(|v| v.as_array()))
            .flatten()
            .filter_map(|v| v.as_str()),
        policy,
    )
}

fn insert_some(row: &mut InventoryRow, column: &str, value: Option<Value>) {
    if let Some(value) = value {
        row.insert(column, value);
    }
}

pub(crate) fn write_workload(
    row: &mut InventoryRow,
    workload: &NormalizedResource,
    policy: &CorrelationPolicy,
) {
    row.insert("replicas", cell(workload, "replicas", policy));
    row.insert("labels", cell(workload, "labels", policy));
}

/// Pod columns; metric columns are only written when some pod has metrics
pub(crate) fn write_pods(
    row: &mut InventoryRow,
    pods: &[&NormalizedResource],
    metrics: &HashMap<&str, &NormalizedResource>,
    policy: &CorrelationPolicy,
) {
    row.insert("pod_count", pods.len());
    if pods.is_empty() {
        return;
    }

    row.insert("pod_name", names(pods, policy));
    insert_some(
        row,
        "node_name",
        join_set(pods.iter().filter_map(|p| p.attr_str("node_name")), policy),
    );
    insert_some(
        row,
        "pod_image",
        join_set(pods.iter().filter_map(|p| p.attr_str("image")), policy),
    );
    insert_some(
        row,
        "pod_phase",
        join_set(pods.iter().filter_map(|p| p.attr_str("phase")), policy),
    );
    for (column, key) in [
        ("pod_resources", "resources"),
        ("pod_readiness_probe", "readiness_probe"),
        ("pod_liveness_probe", "liveness_probe"),
    ] {
        row.insert(
            column,
            json_values(pods.iter().filter_map(|p| p.attr(key)), true),
        );
    }

    let usage: Vec<Option<&NormalizedResource>> = pods
        .iter()
        .map(|p| metrics.get(p.name.as_str()).copied())
        .collect();
    if usage.iter().any(Option::is_some) {
        for (column, key) in [("pod_cpu_usage", "cpu"), ("pod_memory_usage", "memory")] {
            let values = usage
                .iter()
                .map(|m| match m {
                    Some(m) => cell(m, key, policy),
                    None => Value::String(policy.marker.clone()),
                })
                .collect();
            row.insert(column, join_cells(values, policy));
        }
    }
}

pub(crate) fn write_services(
    row: &mut InventoryRow,
    services: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if services.is_empty() {
        return;
    }
    row.insert("service_name", names(services, policy));
    row.insert("service_type", parallel(services, "type", policy));
    row.insert("service_cluster_ip", parallel(services, "cluster_ip", policy));
    row.insert(
        "service_ports",
        json_values(services.iter().filter_map(|s| s.attr("ports")), false),
    );
}

pub(crate) fn write_routes(
    row: &mut InventoryRow,
    routes: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if routes.is_empty() {
        return;
    }
    row.insert("route_name", names(routes, policy));
    row.insert("route_host", parallel(routes, "host", policy));
}

pub(crate) fn write_autoscalers(
    row: &mut InventoryRow,
    autoscalers: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if autoscalers.is_empty() {
        return;
    }
    row.insert("hpa_name", names(autoscalers, policy));
    row.insert("hpa_min_replicas", parallel(autoscalers, "min_replicas", policy));
    row.insert("hpa_max_replicas", parallel(autoscalers, "max_replicas", policy));
    row.insert(
        "hpa_current_cpu_utilization",
        parallel(autoscalers, "current_cpu_utilization", policy),
    );
}

pub(crate) fn write_quotas(
    row: &mut InventoryRow,
    quotas: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if quotas.is_empty() {
        return;
    }
    row.insert("quota_name", names(quotas, policy));
    row.insert(
        "quota_limits",
        json_values(quotas.iter().filter_map(|q| q.attr("limits")), false),
    );
}

pub(crate) fn write_volumes(
    row: &mut InventoryRow,
    volumes: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if volumes.is_empty() {
        return;
    }
    row.insert("pv_name", names(volumes, policy));
    row.insert("pv_capacity", parallel(volumes, "capacity", policy));
    insert_some(row, "pv_access_modes", array_set(volumes, "access_modes", policy));
    row.insert("pv_reclaim_policy", parallel(volumes, "reclaim_policy", policy));
    row.insert("pv_claim", parallel(volumes, "claim_name", policy));
}

pub(crate) fn write_claims(
    row: &mut InventoryRow,
    claims: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if claims.is_empty() {
        return;
    }
    row.insert("pvc_name", names(claims, policy));
    row.insert("pvc_volume_name", parallel(claims, "volume_name", policy));
    insert_some(row, "pvc_access_modes", array_set(claims, "access_modes", policy));
    row.insert("pvc_capacity", parallel(claims, "capacity", policy));
}

pub(crate) fn write_secrets(
    row: &mut InventoryRow,
    secrets: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if secrets.is_empty() {
        return;
    }
    row.insert("secret_name", names(secrets, policy));
    row.insert("secret_type", parallel(secrets, "type", policy));
}

pub(crate) fn write_config_maps(
    row: &mut InventoryRow,
    config_maps: &[&NormalizedResource],
    policy: &CorrelationPolicy,
) {
    if config_maps.is_empty() {
        return;
    }
    row.insert("configmap_name", names(config_maps, policy));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;
    use serde_json::json;

    fn pod(name: &str, node: &str, image: &str) -> NormalizedResource {
        NormalizedResource::new(ResourceKind::Pod, "payments", name)
            .with("node_name", node)
            .with("image", image)
            .with("resources", json!({}))
            .with("readiness_probe", json!({}))
            .with("liveness_probe", json!({}))
            .with("phase", "Running")
    }

    #[test]
    fn test_pods_collapse_sets_and_keep_metric_alignment() {
        let a = pod("api-1", "n2", "app:1.0");
        let b = pod("api-2", "n1", "app:1.0");
        let c = pod("api-3", "n1", "app:1.1");
        let metrics_a = NormalizedResource::new(ResourceKind::PodMetrics, "payments", "api-1")
            .with("cpu", "3m")
            .with("memory", "45Mi");
        let metrics_c = NormalizedResource::new(ResourceKind::PodMetrics, "payments", "api-3")
            .with("cpu", "1m")
            .with("memory", "20Mi");
        let metrics: HashMap<&str, &NormalizedResource> =
            [("api-1", &metrics_a), ("api-3", &metrics_c)].into_iter().collect();

        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_pods(&mut row, &[&a, &b, &c], &metrics, &CorrelationPolicy::default());

        assert_eq!(row.get("pod_count"), Some(&json!(3)));
        assert_eq!(row.get_str("pod_name"), Some("api-1,api-2,api-3"));
        assert_eq!(row.get_str("node_name"), Some("n1,n2"));
        assert_eq!(row.get_str("pod_image"), Some("app:1.0,app:1.1"));
        assert_eq!(row.get_str("pod_phase"), Some("Running"));
        assert_eq!(row.get_str("pod_resources"), Some("{}"));
        assert_eq!(row.get_str("pod_cpu_usage"), Some("3m,N/A,1m"));
        assert_eq!(row.get_str("pod_memory_usage"), Some("45Mi,N/A,20Mi"));
    }

    #[test]
    fn test_pods_without_metrics_omit_metric_columns() {
        let a = pod("api-1", "n1", "app:1.0");
        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_pods(&mut row, &[&a], &HashMap::new(), &CorrelationPolicy::default());
        assert!(!row.contains("pod_cpu_usage"));
        assert!(!row.contains("pod_memory_usage"));
    }

    #[test]
    fn test_no_pods_only_writes_count() {
        let mut row = InventoryRow::new("payments", "StatefulSet", "db");
        write_pods(&mut row, &[], &HashMap::new(), &CorrelationPolicy::default());
        assert_eq!(row.get("pod_count"), Some(&json!(0)));
        assert!(!row.contains("pod_name"));
    }

    #[test]
    fn test_single_value_keeps_type() {
        let hpa = NormalizedResource::new(ResourceKind::HorizontalPodAutoscaler, "payments", "api")
            .with("min_replicas", 2)
            .with("max_replicas", 5)
            .with("current_cpu_utilization", UNAVAILABLE);
        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_autoscalers(&mut row, &[&hpa], &CorrelationPolicy::default());
        assert_eq!(row.get("hpa_min_replicas"), Some(&json!(2)));
        assert_eq!(row.get("hpa_current_cpu_utilization"), Some(&json!("N/A")));
    }

    #[test]
    fn test_service_ports_keep_full_port_objects() {
        let svc = NormalizedResource::new(ResourceKind::Service, "payments", "api-svc")
            .with("type", "NodePort")
            .with("cluster_ip", "172.30.0.10")
            .with(
                "ports",
                json!([{"name": "http", "port": 8080, "targetPort": 8081, "nodePort": 30080}]),
            );
        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_services(&mut row, &[&svc], &CorrelationPolicy::default());
        assert_eq!(row.get_str("service_name"), Some("api-svc"));
        assert_eq!(row.get_str("service_cluster_ip"), Some("172.30.0.10"));
        assert_eq!(
            row.get_str("service_ports"),
            Some(r#"[{"name":"http","port":8080,"targetPort":8081,"nodePort":30080}]"#)
        );
    }

    #[test]
    fn test_service_ports_stay_aligned_with_services() {
        let web = NormalizedResource::new(ResourceKind::Service, "payments", "api-web")
            .with("type", "ClusterIP")
            .with("cluster_ip", "172.30.0.10")
            .with("ports", json!([{"port": 80, "protocol": "TCP"}]));
        let headless = NormalizedResource::new(ResourceKind::Service, "payments", "api-headless")
            .with("type", "ClusterIP")
            .with("cluster_ip", "None")
            .with("ports", json!([{"port": 80, "protocol": "TCP"}]));
        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_services(&mut row, &[&web, &headless], &CorrelationPolicy::default());
        assert_eq!(row.get_str("service_cluster_ip"), Some("172.30.0.10,None"));
        assert_eq!(
            row.get_str("service_ports"),
            Some(r#"[[{"port":80,"protocol":"TCP"}],[{"port":80,"protocol":"TCP"}]]"#)
        );
    }

    #[test]
    fn test_volume_claim_column() {
        let pv = NormalizedResource::new(ResourceKind::PersistentVolume, "payments", "pv-001")
            .with("capacity", "5Gi")
            .with("access_modes", json!(["ReadWriteOnce"]))
            .with("reclaim_policy", "Delete")
            .with("claim_name", "data");
        let mut row = InventoryRow::new("payments", "StatefulSet", "db");
        write_volumes(&mut row, &[&pv], &CorrelationPolicy::default());
        assert_eq!(row.get_str("pv_claim"), Some("data"));
        assert_eq!(row.get_str("pv_access_modes"), Some("ReadWriteOnce"));
    }

    #[test]
    fn test_multiple_quotas_are_all_kept() {
        let compute = NormalizedResource::new(ResourceKind::ResourceQuota, "payments", "compute")
            .with("limits", json!({"cpu": "4"}));
        let objects = NormalizedResource::new(ResourceKind::ResourceQuota, "payments", "objects")
            .with("limits", json!({"pods": "10"}));
        let mut row = InventoryRow::new("payments", "Deployment", "api");
        write_quotas(&mut row, &[&compute, &objects], &CorrelationPolicy::default());
        assert_eq!(row.get_str("quota_name"), Some("compute,objects"));
        assert_eq!(
            row.get_str("quota_limits"),
            Some(r#"[{"cpu":"4"},{"pods":"10"}]"#)
        );
    }

    #[test]
    fn test_custom_marker_replaces_sentinel() {
        let policy = CorrelationPolicy {
            marker: "-".to_string(),
            ..CorrelationPolicy::default()
        };
        let pvc = NormalizedResource::new(ResourceKind::PersistentVolumeClaim, "payments", "data")
            .with("volume_name", UNAVAILABLE)
            .with("access_modes", json!([]))
            .with("capacity", "1Gi");
        let mut row = InventoryRow::new("payments", "PersistentVolumeClaim", "data");
        write_claims(&mut row, &[&pvc], &policy);
        assert_eq!(row.get_str("pvc_volume_name"), Some("-"));
        assert_eq!(row.get_str("pvc_capacity"), Some("1Gi"));
        assert!(!row.contains("pvc_access_modes"));
    }
}
