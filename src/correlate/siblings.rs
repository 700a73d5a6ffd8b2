//! Namespace-wide siblings
//!
//! Quotas, bound volumes, claims, secrets, configmaps and the node selector
//! are not owned by any single workload. They are gathered once per namespace
//! and then written onto workload rows, or emitted on their own when the
//! namespace runs no workloads.

use super::{CorrelationPolicy, NamespaceSnapshot, columns};
use crate::models::{InventoryRow, NormalizedResource, ResourceKind};

#[derive(Debug, Default)]
pub struct NamespaceSiblings<'a> {
    pub namespace: &'a str,
    pub quotas: Vec<&'a NormalizedResource>,
    pub volumes: Vec<&'a NormalizedResource>,
    pub claims: Vec<&'a NormalizedResource>,
    pub secrets: Vec<&'a NormalizedResource>,
    pub config_maps: Vec<&'a NormalizedResource>,
    pub node_selector: Option<&'a str>,
}

impl<'a> NamespaceSiblings<'a> {
    pub fn gather(snapshot: &'a NamespaceSnapshot, policy: &CorrelationPolicy) -> Self {
        let namespace = snapshot.namespace.as_str();
        Self {
            namespace,
            quotas: snapshot.of_kind(ResourceKind::ResourceQuota).collect(),
            volumes: snapshot
                .of_kind(ResourceKind::PersistentVolume)
                .filter(|pv| pv.attr_str("bound_namespace") == Some(namespace))
                .collect(),
            claims: snapshot
                .of_kind(ResourceKind::PersistentVolumeClaim)
                .collect(),
            secrets: snapshot
                .of_kind(ResourceKind::Secret)
                .filter(|s| !policy.is_secret_excluded(&s.name))
                .collect(),
            config_maps: snapshot
                .of_kind(ResourceKind::ConfigMap)
                .filter(|cm| !policy.is_config_map_excluded(&cm.name))
                .collect(),
            node_selector: snapshot
                .node_selector
                .as_deref()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    /// Write every sibling column onto a workload row
    pub fn attach(&self, row: &mut InventoryRow, policy: &CorrelationPolicy) {
        columns::write_quotas(row, &self.quotas, policy);
        columns::write_volumes(row, &self.volumes, policy);
        columns::write_claims(row, &self.claims, policy);
        columns::write_secrets(row, &self.secrets, policy);
        columns::write_config_maps(row, &self.config_maps, policy);
        if let Some(selector) = self.node_selector {
            row.insert("node_selector", selector);
        }
    }

    /// One row per sibling, for namespaces without workloads
    pub fn standalone_rows(&self, policy: &CorrelationPolicy) -> Vec<InventoryRow> {
        type Writer = fn(&mut InventoryRow, &[&NormalizedResource], &CorrelationPolicy);
        let groups: [(&[&NormalizedResource], Writer); 5] = [
            (self.quotas.as_slice(), columns::write_quotas),
            (self.volumes.as_slice(), columns::write_volumes),
            (self.claims.as_slice(), columns::write_claims),
            (self.secrets.as_slice(), columns::write_secrets),
            (self.config_maps.as_slice(), columns::write_config_maps),
        ];

        let mut rows = Vec::new();
        for (resources, write) in groups {
            for resource in resources {
                let mut row =
                    InventoryRow::new(self.namespace, resource.kind.as_str(), &resource.name);
                write(&mut row, &[*resource], policy);
                rows.push(row);
            }
        }

        if let Some(selector) = self.node_selector {
            let mut row = InventoryRow::new(
                self.namespace,
                ResourceKind::Namespace.as_str(),
                self.namespace,
            );
            row.insert("node_selector", selector);
            rows.push(row);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> NamespaceSnapshot {
        let mut snapshot =
            NamespaceSnapshot::new("payments").with_node_selector(Some("region=east".into()));
        snapshot.push(NormalizedResource::new(ResourceKind::Secret, "payments", "app-db-creds"));
        snapshot.push(NormalizedResource::new(
            ResourceKind::Secret,
            "payments",
            "builder-token-abc",
        ));
        snapshot.push(NormalizedResource::new(
            ResourceKind::ConfigMap,
            "payments",
            "kube-root-ca.crt",
        ));
        snapshot.push(
            NormalizedResource::new(ResourceKind::PersistentVolume, "billing", "pv-other")
                .with("bound_namespace", "billing"),
        );
        snapshot
    }

    #[test]
    fn test_gather_applies_prefix_exclusions() {
        let snapshot = snapshot();
        let siblings = NamespaceSiblings::gather(&snapshot, &CorrelationPolicy::default());

        let secrets: Vec<&str> = siblings.secrets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(secrets, vec!["app-db-creds"]);
        assert!(siblings.config_maps.is_empty());
        assert!(siblings.volumes.is_empty());
        assert_eq!(siblings.node_selector, Some("region=east"));
    }

    #[test]
    fn test_standalone_rows_cover_every_sibling() {
        let snapshot = snapshot();
        let siblings = NamespaceSiblings::gather(&snapshot, &CorrelationPolicy::default());
        let rows = siblings.standalone_rows(&CorrelationPolicy::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_str("kind"), Some("Secret"));
        assert_eq!(rows[0].get_str("secret_name"), Some("app-db-creds"));
        assert_eq!(rows[1].get_str("kind"), Some("Namespace"));
        assert_eq!(rows[1].get_str("node_selector"), Some("region=east"));
    }
}
