//! Inventory model layer
//!
//! Structure:
//! - `resource_kind.rs` - Enumeration of every queried resource kind
//! - `resource.rs` - Raw and normalized resource records
//! - `row.rs` - Flattened report rows

mod resource;
mod resource_kind;
mod row;

pub use resource::{NormalizedResource, RawResource, UNAVAILABLE};
pub use resource_kind::ResourceKind;
pub use row::{COL_KIND, COL_NAME, COL_NAMESPACE, InventoryRow, render_value};
