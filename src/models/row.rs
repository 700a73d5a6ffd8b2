//! Flattened inventory rows

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const COL_NAMESPACE: &str = "namespace";
pub const COL_KIND: &str = "kind";
pub const COL_NAME: &str = "name";

/// One flat report row: column name to scalar value
///
/// Column order is insertion order until the schema unifier rewrites every
/// row into the run's unified column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryRow {
    fields: Map<String, Value>,
}

impl InventoryRow {
    /// Start a row keyed by namespace, kind and name
    pub fn new(namespace: &str, kind: &str, name: &str) -> Self {
        let mut row = Self::default();
        row.insert(COL_NAMESPACE, namespace);
        row.insert(COL_KIND, kind);
        row.insert(COL_NAME, name);
        row
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(|v| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Deterministic ordering key: (namespace, kind, name)
    pub fn sort_key(&self) -> (String, String, String) {
        let part = |column| self.get_str(column).unwrap_or_default().to_string();
        (part(COL_NAMESPACE), part(COL_KIND), part(COL_NAME))
    }

    /// Render a cell as text for tabular output
    pub fn render(&self, column: &str) -> Option<String> {
        self.get(column).map(render_value)
    }
}

/// Text form of a cell value; nested values become compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
