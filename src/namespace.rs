//! Namespace model
//!
//! One namespace per spec sub-directory (`linux/`, `darwin/`, ...).

use crate::platform;
use crate::table::Table;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Human-readable platform description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tables: BTreeMap<String, Table>,
}

impl Namespace {
    /// Create the namespace for a canonical spec directory.
    ///
    /// Unknown directories are rejected.
    pub fn new(key: &str) -> Result<Self> {
        let name = platform::platform_description(key)?;
        Ok(Self {
            key: key.to_string(),
            name: name.to_string(),
            tables: BTreeMap::new(),
        })
    }

    /// Insert a table under its name; the previous table of that name is replaced.
    pub fn insert(&mut self, mut table: Table) -> Option<Table> {
        table.namespace_id = self.key.clone();
        let previous = self.tables.insert(table.name.clone(), table);
        if let Some(old) = &previous {
            tracing::debug!(namespace = %self.key, table = %old.name, "Table replaced");
        }
        previous
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
