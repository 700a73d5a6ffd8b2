//! Resource kind definitions
//!
//! Centralized enum for every resource kind the inventory queries.
//! This eliminates hardcoded kind strings throughout the pipeline and
//! provides type safety for per-kind dispatch.

use std::fmt;

/// Enumeration of all resource kinds consumed by the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Namespace,
    // Workloads
    Deployment,
    DeploymentConfig,
    StatefulSet,
    Pod,
    // Networking
    Service,
    Route,
    HorizontalPodAutoscaler,
    // Namespace-wide siblings
    ResourceQuota,
    PersistentVolume,
    PersistentVolumeClaim,
    Secret,
    ConfigMap,
    // metrics.k8s.io (what `kubectl top pod` reads)
    PodMetrics,
}

impl ResourceKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::DeploymentConfig => "DeploymentConfig",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::Route => "Route",
            ResourceKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            ResourceKind::ResourceQuota => "ResourceQuota",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::Secret => "Secret",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::PodMetrics => "PodMetrics",
        }
    }

    /// Kinds queried once per namespace, in query order
    pub fn namespaced() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Deployment,
            ResourceKind::DeploymentConfig,
            ResourceKind::StatefulSet,
            ResourceKind::Service,
            ResourceKind::Route,
            ResourceKind::HorizontalPodAutoscaler,
            ResourceKind::ResourceQuota,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::Secret,
            ResourceKind::ConfigMap,
            ResourceKind::PodMetrics,
        ]
    }

    /// Replica-managing kinds that own pods
    pub fn workloads() -> &'static [Self] {
        &[
            ResourceKind::Deployment,
            ResourceKind::DeploymentConfig,
            ResourceKind::StatefulSet,
        ]
    }

    pub fn is_workload(&self) -> bool {
        Self::workloads().contains(self)
    }

    /// Kinds served by API groups that may not exist on every cluster
    ///
    /// OpenShift-only kinds are absent on vanilla Kubernetes, and pod metrics
    /// need a metrics backend. When the API group is not served these kinds
    /// are treated as empty without raising a warning.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            ResourceKind::DeploymentConfig | ResourceKind::Route | ResourceKind::PodMetrics
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
