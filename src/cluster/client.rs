//! Resource client
//!
//! The leaf of the pipeline: list one resource kind in one namespace (or
//! cluster-wide) and hand back the raw records. Production listing goes through
//! `kube::Api<DynamicObject>` so that OpenShift and metrics API groups can be
//! queried next to the built-in kinds without generated types.

use crate::error::CollectError;
use crate::models::{RawResource, ResourceKind};
use async_trait::async_trait;
use k8s_openapi::api::{apps, autoscaling, core};
use kube::Api;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};

/// A single listing request: one kind in one namespace, or cluster-wide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
}

impl ResourceQuery {
    pub fn namespaced(kind: ResourceKind, namespace: &str) -> Self {
        Self {
            kind,
            namespace: Some(namespace.to_string()),
        }
    }

    pub fn cluster(kind: ResourceKind) -> Self {
        Self {
            kind,
            namespace: None,
        }
    }
}

/// Capability to list raw resources
///
/// Each call is independent. Implementations report `CollectError::Auth`
/// when the session is rejected and `Transport`/`NotServed` for anything else.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(&self, query: ResourceQuery) -> Result<Vec<RawResource>, CollectError>;
}

/// `ResourceClient` backed by a live Kubernetes/OpenShift API server
#[derive(Clone)]
pub struct KubeResourceClient {
    client: kube::Client,
    page_size: u32,
}

impl KubeResourceClient {
    pub fn new(client: kube::Client, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    fn api(&self, query: &ResourceQuery) -> Api<DynamicObject> {
        let resource = api_resource(query.kind);
        match &query.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn list(&self, query: ResourceQuery) -> Result<Vec<RawResource>, CollectError> {
        let api = self.api(&query);
        let mut params = ListParams::default().limit(self.page_size);
        let mut items = Vec::new();

        // Follow continue tokens until the listing is exhausted
        loop {
            let page = api
                .list(&params)
                .await
                .map_err(|e| classify_error(e, &query))?;

            for obj in page.items {
                let namespace = obj
                    .metadata
                    .namespace
                    .clone()
                    .or_else(|| query.namespace.clone());
                let body = serde_json::to_value(&obj).map_err(|e| {
                    CollectError::transport(query.kind, query.namespace.as_deref(), e.to_string())
                })?;
                items.push(RawResource::new(query.kind, namespace, body));
            }

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    params = params.continue_token(&token);
                }
                _ => break,
            }
        }

        tracing::debug!(
            kind = %query.kind,
            namespace = query.namespace.as_deref().unwrap_or(""),
            "Listed {} records",
            items.len()
        );
        Ok(items)
    }
}

/// Map a resource kind to the API resource that serves it
pub fn api_resource(kind: ResourceKind) -> ApiResource {
    match kind {
        ResourceKind::Namespace => ApiResource::erase::<core::v1::Namespace>(&()),
        ResourceKind::Pod => ApiResource::erase::<core::v1::Pod>(&()),
        ResourceKind::Deployment => ApiResource::erase::<apps::v1::Deployment>(&()),
        ResourceKind::StatefulSet => ApiResource::erase::<apps::v1::StatefulSet>(&()),
        ResourceKind::Service => ApiResource::erase::<core::v1::Service>(&()),
        // autoscaling/v1 still reports currentCPUUtilizationPercentage
        ResourceKind::HorizontalPodAutoscaler => {
            ApiResource::erase::<autoscaling::v1::HorizontalPodAutoscaler>(&())
        }
        ResourceKind::ResourceQuota => ApiResource::erase::<core::v1::ResourceQuota>(&()),
        ResourceKind::PersistentVolume => ApiResource::erase::<core::v1::PersistentVolume>(&()),
        ResourceKind::PersistentVolumeClaim => {
            ApiResource::erase::<core::v1::PersistentVolumeClaim>(&())
        }
        ResourceKind::Secret => ApiResource::erase::<core::v1::Secret>(&()),
        ResourceKind::ConfigMap => ApiResource::erase::<core::v1::ConfigMap>(&()),
        ResourceKind::DeploymentConfig => ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk("apps.openshift.io", "v1", "DeploymentConfig"),
            "deploymentconfigs",
        ),
        ResourceKind::Route => ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk("route.openshift.io", "v1", "Route"),
            "routes",
        ),
        ResourceKind::PodMetrics => ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics"),
            "pods",
        ),
    }
}

/// Classify a client error for one query
///
/// 401 (or a client-side credential failure) means the session is gone and
/// the run must stop. A 404 on a list means the API group is not served.
pub fn classify_error(err: kube::Error, query: &ResourceQuery) -> CollectError {
    match err {
        kube::Error::Api(resp) if resp.code == 401 => CollectError::Auth(resp.message),
        kube::Error::Api(resp) if resp.code == 404 => CollectError::NotServed { kind: query.kind },
        kube::Error::Auth(e) => CollectError::Auth(e.to_string()),
        other => CollectError::transport(query.kind, query.namespace.as_deref(), other.to_string()),
    }
}
