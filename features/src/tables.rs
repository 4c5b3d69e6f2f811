//! Auxiliary named tables for the aggregation.
//!
//! Callers can expose extra tables (as flat JSON rows) to the aggregation
//! through the [`TableSource`] capability instead of registering them by name
//! in some global query context.

use std::collections::HashMap;

use serde_json::Value;

/// Capability to look up an auxiliary table by name.
pub trait TableSource {
    /// Returns the rows of the named table, or `None` if it was not provided.
    fn rows(&self, name: &str) -> Option<&[Value]>;
}

/// Map-backed [`TableSource`]; the default value provides no tables.
#[derive(Debug, Default)]
pub struct ExtraTables {
    tables: HashMap<String, Vec<Value>>,
}

impl ExtraTables {
    /// Registers (or replaces) a named table.
    pub fn register(&mut self, name: impl Into<String>, rows: Vec<Value>) {
        self.tables.insert(name.into(), rows);
    }
}

impl TableSource for ExtraTables {
    fn rows(&self, name: &str) -> Option<&[Value]> {
        self.tables.get(name).map(Vec::as_slice)
    }
}
