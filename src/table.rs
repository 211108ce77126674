//! Table model
//!
//! A table is everything one `.table` file declares. Tables do not point
//! back at their namespace; `namespace_id` names it and the catalog resolves it.

use crate::column::SqlColumn;
use crate::schema::Schema;
use crate::value::Scalar;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Key of the owning namespace, set when the table is recorded
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Scalar>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub implementation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fuzz_paths: Vec<String>,
    /// Platform key to the extended schema registered for it
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extended_schemas: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Where a schema sits within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSlot<'a> {
    Base,
    Extended(&'a str),
}

impl Table {
    /// Create an empty table with a provisional name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Base schema followed by every extended schema, with their slots.
    pub fn schemas(&self) -> impl Iterator<Item = (SchemaSlot<'_>, &Schema)> {
        self.schema
            .iter()
            .map(|s| (SchemaSlot::Base, s))
            .chain(
                self.extended_schemas
                    .iter()
                    .map(|(platform, s)| (SchemaSlot::Extended(platform.as_str()), s)),
            )
    }

    /// Total number of base columns
    pub fn column_count(&self) -> usize {
        self.schema.as_ref().map(|s| s.columns.len()).unwrap_or(0)
    }

    /// Ordered column descriptors for the relational engine.
    ///
    /// Base columns come first, then the columns of each extended schema
    /// registered under a platform in `platforms`, in filter order.
    pub fn sql_columns<S: AsRef<str>>(&self, platforms: &[S]) -> Result<Vec<SqlColumn>> {
        let mut cols = Vec::new();
        if let Some(schema) = &self.schema {
            for col in &schema.columns {
                cols.push(col.to_sql(&self.name)?);
            }
        }

        for platform in platforms {
            let Some(ext) = self.extended_schemas.get(platform.as_ref()) else {
                continue;
            };
            for col in &ext.columns {
                cols.push(col.to_sql(&self.name)?);
            }
        }
        Ok(cols)
    }
}
