//! Workload groups
//!
//! A workload owns every pod, service, route and autoscaler that the naming
//! rules tie to it. Matching is by name only; a resource may land in more
//! than one group.

use super::CorrelationPolicy;
use super::columns;
use crate::models::{InventoryRow, NormalizedResource};
use std::collections::HashMap;

#[derive(Debug)]
pub struct WorkloadGroup<'a> {
    pub workload: &'a NormalizedResource,
    pub pods: Vec<&'a NormalizedResource>,
    pub services: Vec<&'a NormalizedResource>,
    pub routes: Vec<&'a NormalizedResource>,
    pub autoscalers: Vec<&'a NormalizedResource>,
}

impl<'a> WorkloadGroup<'a> {
    /// Gather the resources that belong to `workload`
    pub fn assemble(
        workload: &'a NormalizedResource,
        pods: &[&'a NormalizedResource],
        services: &[&'a NormalizedResource],
        routes: &[&'a NormalizedResource],
        autoscalers: &[&'a NormalizedResource],
    ) -> Self {
        let name = workload.name.as_str();

        let pods = pods
            .iter()
            .copied()
            .filter(|pod| pod.name.contains(name))
            .collect();

        let services: Vec<&NormalizedResource> = services
            .iter()
            .copied()
            .filter(|svc| svc.name.contains(name))
            .collect();

        let routes = routes
            .iter()
            .copied()
            .filter(|route| {
                route.name.contains(name)
                    || route
                        .attr_str("target_service")
                        .is_some_and(|target| services.iter().any(|svc| svc.name == target))
            })
            .collect();

        let autoscalers = autoscalers
            .iter()
            .copied()
            .filter(|hpa| hpa.attr_str("target_name") == Some(name))
            .collect();

        Self {
            workload,
            pods,
            services,
            routes,
            autoscalers,
        }
    }

    /// Every resource this group claimed, workload excluded
    pub fn members(&self) -> impl Iterator<Item = &'a NormalizedResource> + '_ {
        self.pods
            .iter()
            .chain(&self.services)
            .chain(&self.routes)
            .chain(&self.autoscalers)
            .copied()
    }

    pub fn to_row(
        &self,
        metrics: &HashMap<&str, &NormalizedResource>,
        policy: &CorrelationPolicy,
    ) -> InventoryRow {
        let workload = self.workload;
        let mut row =
            InventoryRow::new(&workload.namespace, workload.kind.as_str(), &workload.name);
        columns::write_workload(&mut row, workload, policy);
        columns::write_pods(&mut row, &self.pods, metrics, policy);
        columns::write_services(&mut row, &self.services, policy);
        columns::write_routes(&mut row, &self.routes, policy);
        columns::write_autoscalers(&mut row, &self.autoscalers, policy);
        row
    }
}
