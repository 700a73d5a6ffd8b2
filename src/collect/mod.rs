//! Inventory collection
//!
//! Drives one run end to end: select namespaces, list every kind per
//! namespace concurrently, normalize, correlate, and unify the schema.
//!
//! Namespaces run as tasks on a `JoinSet`; the kinds of one namespace are
//! listed together with `try_join_all`. Every query holds a permit from one
//! shared semaphore, so the cluster never sees more than
//! `max_concurrent_queries` requests from a run. An authentication failure
//! short-circuits its namespace and aborts every other task.

pub mod namespaces;

pub use namespaces::{
    DEFAULT_EXCLUDED_NAMESPACE_PREFIXES, ExclusionPolicy, NamespaceScope,
    list_eligible_namespaces, select_eligible,
};

use crate::cluster::{ResourceClient, ResourceQuery};
use crate::correlate::{CorrelationPolicy, NamespaceSnapshot, correlate};
use crate::error::{CollectError, CollectionWarning};
use crate::models::{InventoryRow, NormalizedResource, ResourceKind};
use crate::normalize::normalize_batch;
use crate::schema::{UnifiedSchema, unify};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 8;

/// Knobs for a collection run
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub max_concurrent_queries: usize,
    pub collect_metrics: bool,
    pub exclusion: ExclusionPolicy,
    pub correlation: CorrelationPolicy,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            collect_metrics: true,
            exclusion: ExclusionPolicy::default(),
            correlation: CorrelationPolicy::default(),
        }
    }
}

impl CollectorSettings {
    /// Kinds listed in every namespace
    fn namespaced_kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::namespaced()
            .iter()
            .copied()
            .filter(|kind| self.collect_metrics || *kind != ResourceKind::PodMetrics)
            .collect()
    }
}

/// Result of a run: unified rows plus everything that went wrong on the way
#[derive(Debug, Clone, Default)]
pub struct InventoryReport {
    pub schema: UnifiedSchema,
    pub rows: Vec<InventoryRow>,
    pub warnings: Vec<CollectionWarning>,
    pub namespaces: Vec<String>,
}

impl InventoryReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Resources and warnings from one query or one namespace
#[derive(Debug)]
struct Harvest<T> {
    items: Vec<T>,
    warnings: Vec<CollectionWarning>,
}

impl<T> Default for Harvest<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub struct InventoryCollector<C: ?Sized> {
    client: Arc<C>,
    settings: Arc<CollectorSettings>,
}

impl<C> InventoryCollector<C>
where
    C: ResourceClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, settings: CollectorSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Run a full collection
    ///
    /// Returns `CollectError` only for failures that make the run
    /// meaningless: the namespace listing failing or the session being
    /// rejected. Everything else ends up in `InventoryReport::warnings`.
    pub async fn collect(&self) -> Result<InventoryReport, CollectError> {
        let scopes =
            list_eligible_namespaces(self.client.as_ref(), &self.settings.exclusion).await?;
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_queries.max(1)));
        let mut warnings = Vec::new();

        // Persistent volumes are cluster-scoped: list once, split per namespace
        let volumes = query_kind(
            self.client.as_ref(),
            &semaphore,
            ResourceQuery::cluster(ResourceKind::PersistentVolume),
        )
        .await?;
        warnings.extend(volumes.warnings);
        let volumes = volumes.items;

        let mut tasks = JoinSet::new();
        for scope in &scopes {
            let bound: Vec<NormalizedResource> = volumes
                .iter()
                .filter(|pv| pv.attr_str("bound_namespace") == Some(scope.name.as_str()))
                .cloned()
                .collect();
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let settings = Arc::clone(&self.settings);
            let scope = scope.clone();
            tasks.spawn(async move {
                collect_namespace(client.as_ref(), &semaphore, &settings, scope, bound).await
            });
        }

        let mut rows = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(harvest)) => {
                    rows.extend(harvest.items);
                    warnings.extend(harvest.warnings);
                }
                Ok(Err(err)) => {
                    tracing::error!("Aborting collection: {}", err);
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    tracing::error!("Namespace collection task failed: {}", join_err);
                    warnings.push(CollectionWarning::query(
                        ResourceKind::Namespace,
                        None,
                        format!("collection task failed: {}", join_err),
                    ));
                }
            }
        }

        // Tasks finish in any order
        rows.sort_by_cached_key(InventoryRow::sort_key);
        let (schema, rows) = unify(rows, &self.settings.correlation.marker);

        tracing::info!(
            namespaces = scopes.len(),
            rows = rows.len(),
            columns = schema.len(),
            warnings = warnings.len(),
            "Collection complete"
        );

        Ok(InventoryReport {
            schema,
            rows,
            warnings,
            namespaces: scopes.into_iter().map(|s| s.name).collect(),
        })
    }
}

/// List every kind in one namespace and correlate the result
async fn collect_namespace<C>(
    client: &C,
    semaphore: &Semaphore,
    settings: &CollectorSettings,
    scope: NamespaceScope,
    volumes: Vec<NormalizedResource>,
) -> Result<Harvest<InventoryRow>, CollectError>
where
    C: ResourceClient + ?Sized,
{
    let queries = settings.namespaced_kinds().into_iter().map(|kind| {
        query_kind(client, semaphore, ResourceQuery::namespaced(kind, &scope.name))
    });
    let harvests = try_join_all(queries).await?;

    let mut snapshot =
        NamespaceSnapshot::new(scope.name.as_str()).with_node_selector(scope.node_selector);
    let mut warnings = Vec::new();
    for harvest in harvests {
        snapshot.extend(harvest.items);
        warnings.extend(harvest.warnings);
    }
    snapshot.extend(volumes);

    let rows = correlate(&snapshot, &settings.correlation);
    tracing::debug!(
        namespace = %scope.name,
        resources = snapshot.resources.len(),
        rows = rows.len(),
        "Collected namespace"
    );
    Ok(Harvest {
        items: rows,
        warnings,
    })
}

/// Run one query under a semaphore permit and absorb recoverable failures
async fn query_kind<C>(
    client: &C,
    semaphore: &Semaphore,
    query: ResourceQuery,
) -> Result<Harvest<NormalizedResource>, CollectError>
where
    C: ResourceClient + ?Sized,
{
    let kind = query.kind;
    let namespace = query.namespace.clone();
    let scope = namespace.as_deref();

    let listed = match semaphore.acquire().await {
        Ok(_permit) => client.list(query).await,
        Err(e) => Err(CollectError::transport(kind, scope, e.to_string())),
    };

    match listed {
        Ok(raws) => {
            let (items, errors) = normalize_batch(raws);
            let warnings = errors
                .iter()
                .map(|e| CollectionWarning::record(e.kind(), scope, e.to_string()))
                .collect();
            Ok(Harvest { items, warnings })
        }
        Err(err) if err.is_fatal() => Err(err),
        Err(CollectError::NotServed { .. }) if kind.is_optional() => {
            tracing::debug!(
                kind = %kind,
                namespace = scope.unwrap_or(""),
                "API not served, skipping"
            );
            Ok(Harvest::default())
        }
        Err(err) => {
            tracing::warn!("{}", err);
            Ok(Harvest {
                items: Vec::new(),
                warnings: vec![CollectionWarning::query(kind, scope, err.to_string())],
            })
        }
    }
}
