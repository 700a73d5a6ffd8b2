//! Shared fixtures for integration tests
//!
//! `FakeCluster` is an in-memory `ResourceClient`: canned responses per
//! (kind, namespace), plus counters for calls and peak concurrency.

#![allow(dead_code)]

use async_trait::async_trait;
use kube_inventory::cluster::{ResourceClient, ResourceQuery};
use kube_inventory::{CollectError, RawResource, ResourceKind};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Key = (ResourceKind, Option<String>);

#[derive(Default)]
pub struct FakeCluster {
    responses: HashMap<Key, Result<Vec<Value>, CollectError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespaces returned by the cluster-wide namespace listing
    pub fn namespaces(self, items: Vec<Value>) -> Self {
        self.with(ResourceKind::Namespace, None, items)
    }

    pub fn with(mut self, kind: ResourceKind, namespace: Option<&str>, items: Vec<Value>) -> Self {
        self.responses
            .insert((kind, namespace.map(str::to_string)), Ok(items));
        self
    }

    pub fn failing(
        mut self,
        kind: ResourceKind,
        namespace: Option<&str>,
        error: CollectError,
    ) -> Self {
        self.responses
            .insert((kind, namespace.map(str::to_string)), Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceClient for FakeCluster {
    async fn list(&self, query: ResourceQuery) -> Result<Vec<RawResource>, CollectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = (query.kind, query.namespace.clone());
        match self.responses.get(&key) {
            Some(Ok(items)) => Ok(items
                .iter()
                .map(|body| RawResource::new(query.kind, query.namespace.clone(), body.clone()))
                .collect()),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(Vec::new()),
        }
    }
}

pub fn namespace(name: &str) -> Value {
    json!({"metadata": {"name": name}})
}

pub fn namespace_with_selector(name: &str, selector: &str) -> Value {
    json!({"metadata": {
        "name": name,
        "annotations": {"openshift.io/node-selector": selector}
    }})
}

pub fn deployment(name: &str, replicas: u32) -> Value {
    json!({
        "metadata": {"name": name, "labels": {"app": name}},
        "spec": {"replicas": replicas}
    })
}

pub fn pod(name: &str, node: &str, image: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {
            "nodeName": node,
            "containers": [{"name": "app", "image": image}]
        },
        "status": {"phase": "Running"}
    })
}

pub fn service(name: &str, port: u16) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {
            "type": "ClusterIP",
            "clusterIP": "172.30.0.10",
            "ports": [{"port": port, "protocol": "TCP"}]
        }
    })
}

pub fn route(name: &str, host: &str, target: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {"host": host, "to": {"kind": "Service", "name": target}}
    })
}

pub fn secret(name: &str, secret_type: &str) -> Value {
    json!({"metadata": {"name": name}, "type": secret_type})
}

pub fn config_map(name: &str) -> Value {
    json!({"metadata": {"name": name}, "data": {"key": "value"}})
}

pub fn pod_metrics(name: &str, cpu: &str, memory: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "containers": [{"name": "app", "usage": {"cpu": cpu, "memory": memory}}]
    })
}

pub fn volume(name: &str, namespace: &str, claim: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {
            "capacity": {"storage": "5Gi"},
            "accessModes": ["ReadWriteOnce"],
            "persistentVolumeReclaimPolicy": "Delete",
            "claimRef": {"namespace": namespace, "name": claim}
        }
    })
}

/// The payments namespace used across tests
pub fn payments_cluster() -> FakeCluster {
    let ns = Some("payments");
    FakeCluster::new()
        .namespaces(vec![
            namespace("openshift-monitoring"),
            namespace("kube-system"),
            namespace("default"),
            namespace("payments"),
            namespace("hostpath-provisioner"),
        ])
        .with(ResourceKind::Deployment, ns, vec![deployment("api", 2)])
        .with(
            ResourceKind::Pod,
            ns,
            vec![pod("api-7f9c-1", "n1", "app:1.0"), pod("api-7f9c-2", "n2", "app:1.0")],
        )
        .with(ResourceKind::Service, ns, vec![service("api-svc", 8080)])
        .with(
            ResourceKind::Secret,
            ns,
            vec![
                secret("api-creds", "Opaque"),
                secret("builder-token", "kubernetes.io/service-account-token"),
            ],
        )
}
