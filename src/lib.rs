//! kube-inventory library
//!
//! This library provides the collection, correlation and reporting pipeline
//! behind the kube-inventory binary. It can be used both as a binary and as a
//! library for testing.

pub mod cli;
pub mod cluster;
pub mod collect;
pub mod config;
pub mod correlate;
pub mod error;
pub mod models;
pub mod normalize;
pub mod report;
pub mod schema;

// Re-export commonly used types for convenience
pub use cluster::{ResourceClient, ResourceQuery};
pub use collect::{CollectorSettings, InventoryCollector, InventoryReport};
pub use correlate::{CorrelationPolicy, NamespaceSnapshot, SiblingAttachment, correlate};
pub use error::{CollectError, CollectionWarning};
pub use models::{InventoryRow, NormalizedResource, RawResource, ResourceKind};
pub use report::{FileReportSink, ReportSink, WriteError};
pub use schema::{UnifiedSchema, unify};
