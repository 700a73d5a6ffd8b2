//! Correlation engine
//!
//! Turns the normalized resources of one namespace into flat inventory rows:
//! one row per workload (Deployment, DeploymentConfig, StatefulSet) carrying
//! its pods, services, routes and autoscalers, plus standalone rows for
//! anything no workload claims.
//!
//! Namespace-wide siblings (quotas, volumes, claims, secrets, configmaps,
//! node selector) are attached according to [`SiblingAttachment`].

mod columns;
mod group;
mod siblings;

pub use group::WorkloadGroup;
pub use siblings::NamespaceSiblings;

use crate::models::{InventoryRow, NormalizedResource, ResourceKind, UNAVAILABLE};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_EXCLUDED_SECRET_PREFIXES: &[&str] = &["builder", "default", "deployer"];
pub const DEFAULT_EXCLUDED_CONFIG_MAP_PREFIXES: &[&str] = &["openshift-", "kube-"];
pub const DEFAULT_LIST_DELIMITER: &str = ",";

/// Everything collected for one namespace, ready to correlate
#[derive(Debug, Clone, Default)]
pub struct NamespaceSnapshot {
    pub namespace: String,
    pub node_selector: Option<String>,
    pub resources: Vec<NormalizedResource>,
}

impl NamespaceSnapshot {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_node_selector(mut self, node_selector: Option<String>) -> Self {
        self.node_selector = node_selector;
        self
    }

    pub fn push(&mut self, resource: NormalizedResource) {
        self.resources.push(resource);
    }

    pub fn extend(&mut self, resources: impl IntoIterator<Item = NormalizedResource>) {
        self.resources.extend(resources);
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &NormalizedResource> + '_ {
        self.resources.iter().filter(move |r| r.kind == kind)
    }
}

/// Which workload rows receive the namespace-wide sibling columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SiblingAttachment {
    /// Every workload row in the namespace
    #[default]
    FanOut,
    /// Only the last workload in (kind, name) order
    LastGroup,
}

impl SiblingAttachment {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiblingAttachment::FanOut => "fanOut",
            SiblingAttachment::LastGroup => "lastGroup",
        }
    }
}

impl fmt::Display for SiblingAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiblingAttachment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "fanout" => Ok(SiblingAttachment::FanOut),
            "lastgroup" => Ok(SiblingAttachment::LastGroup),
            _ => Err(format!(
                "Unknown sibling attachment '{}'. Expected fan-out or last-group",
                s
            )),
        }
    }
}

/// Rules applied while correlating, read once from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPolicy {
    pub excluded_secret_prefixes: Vec<String>,
    pub excluded_config_map_prefixes: Vec<String>,
    pub attachment: SiblingAttachment,
    pub delimiter: String,
    pub marker: String,
}

impl Default for CorrelationPolicy {
    fn default() -> Self {
        Self {
            excluded_secret_prefixes: to_strings(DEFAULT_EXCLUDED_SECRET_PREFIXES),
            excluded_config_map_prefixes: to_strings(DEFAULT_EXCLUDED_CONFIG_MAP_PREFIXES),
            attachment: SiblingAttachment::default(),
            delimiter: DEFAULT_LIST_DELIMITER.to_string(),
            marker: UNAVAILABLE.to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn has_prefix(name: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
}

impl CorrelationPolicy {
    pub fn is_secret_excluded(&self, name: &str) -> bool {
        has_prefix(name, &self.excluded_secret_prefixes)
    }

    pub fn is_config_map_excluded(&self, name: &str) -> bool {
        has_prefix(name, &self.excluded_config_map_prefixes)
    }
}

/// Correlate one namespace into rows sorted by (namespace, kind, name)
pub fn correlate(snapshot: &NamespaceSnapshot, policy: &CorrelationPolicy) -> Vec<InventoryRow> {
    let mut workloads: Vec<&NormalizedResource> = snapshot
        .resources
        .iter()
        .filter(|r| r.kind.is_workload())
        .collect();
    workloads.sort_by(|a, b| (a.kind.as_str(), &a.name).cmp(&(b.kind.as_str(), &b.name)));

    let pods: Vec<&NormalizedResource> = snapshot.of_kind(ResourceKind::Pod).collect();
    let services: Vec<&NormalizedResource> = snapshot.of_kind(ResourceKind::Service).collect();
    let routes: Vec<&NormalizedResource> = snapshot.of_kind(ResourceKind::Route).collect();
    let autoscalers: Vec<&NormalizedResource> = snapshot
        .of_kind(ResourceKind::HorizontalPodAutoscaler)
        .collect();
    let metrics: HashMap<&str, &NormalizedResource> = snapshot
        .of_kind(ResourceKind::PodMetrics)
        .map(|m| (m.name.as_str(), m))
        .collect();
    let siblings = NamespaceSiblings::gather(snapshot, policy);

    let groups: Vec<WorkloadGroup> = workloads
        .iter()
        .copied()
        .map(|w| WorkloadGroup::assemble(w, &pods, &services, &routes, &autoscalers))
        .collect();

    // Names are unique per kind within a namespace
    let claimed: HashSet<(ResourceKind, &str)> = groups
        .iter()
        .flat_map(|g| g.members())
        .map(|r| (r.kind, r.name.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(groups.len());
    let last = groups.len().checked_sub(1);
    for (index, group) in groups.iter().enumerate() {
        let mut row = group.to_row(&metrics, policy);
        let attach = match policy.attachment {
            SiblingAttachment::FanOut => true,
            SiblingAttachment::LastGroup => Some(index) == last,
        };
        if attach {
            siblings.attach(&mut row, policy);
        }
        rows.push(row);
    }

    let unclaimed = |r: &&&NormalizedResource| !claimed.contains(&(r.kind, r.name.as_str()));
    for pod in pods.iter().filter(unclaimed) {
        let mut row = standalone(pod);
        columns::write_pods(&mut row, &[*pod], &metrics, policy);
        rows.push(row);
    }
    for svc in services.iter().filter(unclaimed) {
        let mut row = standalone(svc);
        columns::write_services(&mut row, &[*svc], policy);
        rows.push(row);
    }
    for route in routes.iter().filter(unclaimed) {
        let mut row = standalone(route);
        columns::write_routes(&mut row, &[*route], policy);
        rows.push(row);
    }
    for hpa in autoscalers.iter().filter(unclaimed) {
        let mut row = standalone(hpa);
        columns::write_autoscalers(&mut row, &[*hpa], policy);
        rows.push(row);
    }

    if workloads.is_empty() {
        rows.extend(siblings.standalone_rows(policy));
    }

    rows.sort_by_cached_key(InventoryRow::sort_key);
    tracing::debug!(
        namespace = %snapshot.namespace,
        workloads = workloads.len(),
        rows = rows.len(),
        "Correlated namespace"
    );
    rows
}

fn standalone(resource: &NormalizedResource) -> InventoryRow {
    InventoryRow::new(&resource.namespace, resource.kind.as_str(), &resource.name)
}
