//! Namespace selection
//!
//! Lists the cluster's namespaces once and drops platform namespaces by
//! name prefix. The node-selector annotation is captured from the same
//! listing so no second query per namespace is needed.

use crate::cluster::{ResourceClient, ResourceQuery};
use crate::error::CollectError;
use crate::models::ResourceKind;
use crate::normalize::normalize;

pub const DEFAULT_EXCLUDED_NAMESPACE_PREFIXES: &[&str] =
    &["openshift-", "kube-", "default", "hostpath-provisioner"];

/// A namespace selected for collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceScope {
    pub name: String,
    pub node_selector: Option<String>,
}

impl NamespaceScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_selector: None,
        }
    }
}

/// Namespaces whose names start with any of these prefixes are skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    prefixes: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_NAMESPACE_PREFIXES.iter().copied())
    }
}

impl ExclusionPolicy {
    /// Blank prefixes are ignored; they would exclude everything
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.prefixes.iter().any(|p| namespace.starts_with(p.as_str()))
    }
}

/// Keep the namespaces the policy allows, in the order given
pub fn select_eligible(
    namespaces: impl IntoIterator<Item = NamespaceScope>,
    policy: &ExclusionPolicy,
) -> Vec<NamespaceScope> {
    namespaces
        .into_iter()
        .filter(|ns| !policy.is_excluded(&ns.name))
        .collect()
}

/// List the cluster's namespaces and apply the exclusion policy
///
/// Any failure here is returned as-is; without a namespace list there is
/// nothing to collect.
pub async fn list_eligible_namespaces<C>(
    client: &C,
    policy: &ExclusionPolicy,
) -> Result<Vec<NamespaceScope>, CollectError>
where
    C: ResourceClient + ?Sized,
{
    let raws = client
        .list(ResourceQuery::cluster(ResourceKind::Namespace))
        .await?;

    let mut scopes = Vec::with_capacity(raws.len());
    for raw in &raws {
        match normalize(raw) {
            Ok(ns) => scopes.push(NamespaceScope {
                node_selector: ns.attr_str("node_selector").map(str::to_string),
                name: ns.name,
            }),
            Err(e) => tracing::warn!("Skipping namespace record: {}", e),
        }
    }

    let total = scopes.len();
    let eligible = select_eligible(scopes, policy);
    tracing::info!(
        total,
        eligible = eligible.len(),
        "Selected namespaces for collection"
    );
    Ok(eligible)
}
