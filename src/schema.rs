//! Schema unification
//!
//! Rows come out of correlation with whatever columns their resources
//! produced. Before writing, every row is padded to the union of all columns
//! seen in the run and rewritten into one shared column order.

use crate::models::InventoryRow;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Ordered union of every column name observed in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedSchema {
    columns: Vec<String>,
}

impl UnifiedSchema {
    /// Columns in first-seen order across `rows`
    pub fn from_rows(rows: &[InventoryRow]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for column in rows.iter().flat_map(|r| r.columns()) {
            if seen.insert(column.as_str()) {
                columns.push(column.clone());
            }
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Rewrite one row into schema order, padding gaps with `marker`
    pub fn conform(&self, row: InventoryRow, marker: &str) -> InventoryRow {
        let mut fields = row.into_fields();
        let mut ordered = Map::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = fields
                .remove(column)
                .unwrap_or_else(|| Value::String(marker.to_string()));
            ordered.insert(column.clone(), value);
        }
        InventoryRow::from_fields(ordered)
    }
}

/// Compute the run schema and conform every row to it
pub fn unify(rows: Vec<InventoryRow>, marker: &str) -> (UnifiedSchema, Vec<InventoryRow>) {
    let schema = UnifiedSchema::from_rows(&rows);
    let rows = rows
        .into_iter()
        .map(|row| schema.conform(row, marker))
        .collect();
    (schema, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<InventoryRow> {
        let mut api = InventoryRow::new("payments", "Deployment", "api");
        api.insert("pod_count", 2);
        api.insert("service_name", "api-svc");

        let mut db = InventoryRow::new("payments", "StatefulSet", "db");
        db.insert("pvc_name", "data");
        db.insert("pod_count", 1);

        vec![api, db]
    }

    #[test]
    fn test_first_seen_order() {
        let schema = UnifiedSchema::from_rows(&rows());
        assert_eq!(
            schema.columns(),
            ["namespace", "kind", "name", "pod_count", "service_name", "pvc_name"]
        );
        assert!(schema.contains("pvc_name"));
        assert!(!schema.contains("route_name"));
    }

    #[test]
    fn test_every_row_matches_schema() {
        let (schema, rows) = unify(rows(), "N/A");
        for row in &rows {
            let columns: Vec<&String> = row.columns().collect();
            assert_eq!(columns.len(), schema.len());
            assert!(columns.iter().zip(schema.columns()).all(|(a, b)| *a == b));
        }
        assert_eq!(rows[0].get("pvc_name"), Some(&json!("N/A")));
        assert_eq!(rows[1].get("service_name"), Some(&json!("N/A")));
        assert_eq!(rows[1].get("pod_count"), Some(&json!(1)));
    }

    #[test]
    fn test_unify_is_idempotent() {
        let (schema, once) = unify(rows(), "-");
        let (again_schema, twice) = unify(once.clone(), "-");
        assert_eq!(schema, again_schema);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_run() {
        let (schema, rows) = unify(Vec::new(), "N/A");
        assert!(schema.is_empty());
        assert!(rows.is_empty());
    }
}
