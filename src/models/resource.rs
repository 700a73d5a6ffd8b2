//! Raw and normalized resource records

use super::ResourceKind;
use serde_json::{Map, Value};

/// Sentinel for attributes a record does not carry
pub const UNAVAILABLE: &str = "N/A";

/// A resource exactly as returned by the cluster listing
///
/// The body is the opaque JSON tree of the object. Records are produced by a
/// [`crate::cluster::ResourceClient`] and consumed by the normalizer within the
/// same run.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResource {
    pub kind: ResourceKind,
    /// Namespace the query was issued in (None for cluster-scoped listings)
    pub namespace: Option<String>,
    pub body: Value,
}

impl RawResource {
    pub fn new(kind: ResourceKind, namespace: Option<String>, body: Value) -> Self {
        Self {
            kind,
            namespace,
            body,
        }
    }

    /// `metadata.name`, if present and a string
    pub fn name(&self) -> Option<&str> {
        self.body
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
    }
}

/// A resource reduced to its canonical, kind-specific attribute set
///
/// `name` and `namespace` are always populated; every other attribute is
/// defaulted by the normalizer when the raw record lacks it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResource {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
    pub attributes: Map<String, Value>,
}

impl NormalizedResource {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute, treating the "unavailable" sentinel as absent
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key)
            .and_then(|v| v.as_str())
            .filter(|s| *s != UNAVAILABLE)
    }
}
