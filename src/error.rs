//! Collection error taxonomy
//!
//! `CollectError::Auth` is fatal to a run. Every other failure is absorbed at
//! the query or record level and surfaced as a [`CollectionWarning`].

use crate::models::ResourceKind;
use std::fmt;

/// Failure of a single resource query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    /// Session rejected or expired; aborts the run
    #[error("Authentication rejected by the cluster: {0}")]
    Auth(String),

    /// The API group serving this kind does not exist on the cluster
    #[error("{kind} is not served by this cluster")]
    NotServed { kind: ResourceKind },

    /// Any other failure listing one (namespace, kind) pair
    #[error("Failed to list {kind} in {}: {message}", scope_label(.namespace))]
    Transport {
        kind: ResourceKind,
        namespace: Option<String>,
        message: String,
    },
}

impl CollectError {
    pub fn transport(
        kind: ResourceKind,
        namespace: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        CollectError::Transport {
            kind,
            namespace: namespace.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::Auth(_))
    }
}

fn scope_label(namespace: &Option<String>) -> &str {
    namespace.as_deref().unwrap_or("cluster scope")
}

/// Where a recoverable failure was absorbed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningStage {
    /// A whole (namespace, kind) query failed and was treated as empty
    Query,
    /// A single malformed record was dropped
    Record,
}

/// A recoverable failure recorded during collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionWarning {
    pub namespace: Option<String>,
    pub kind: ResourceKind,
    pub stage: WarningStage,
    pub message: String,
}

impl CollectionWarning {
    pub fn query(kind: ResourceKind, namespace: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            kind,
            stage: WarningStage::Query,
            message: message.into(),
        }
    }

    pub fn record(kind: ResourceKind, namespace: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            kind,
            stage: WarningStage::Record,
            message: message.into(),
        }
    }
}

impl fmt::Display for CollectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            WarningStage::Query => "query failed",
            WarningStage::Record => "record dropped",
        };
        write!(
            f,
            "[{}/{}] {}: {}",
            scope_label(&self.namespace),
            self.kind,
            stage,
            self.message
        )
    }
}
