//! Virtual database - the extracted schemas as empty relational tables
//!
//! Tables are registered first (column descriptors only), then
//! [`Database::initialize`] materialises every one of them in an
//! in-memory SQLite connection. After that the manifest is locked and
//! the database only answers queries.

use crate::catalog::Catalog;
use crate::column::SqlColumn;
use crate::table::Table;
use crate::{Error, Result};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_DATABASE_NAME: &str = "osquery";

#[derive(Debug)]
pub struct Database {
    name: String,
    tables: BTreeMap<String, Vec<SqlColumn>>,
    conn: Option<Connection>,
}

/// Result of a query: column names plus rows of JSON values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
            conn: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.is_some()
    }

    /// Register a table with the base columns plus the extended columns
    /// of every platform in `platforms`.
    ///
    /// A table registered twice keeps the later definition. A table with
    /// no columns for `platforms` cannot be created and is left out.
    pub fn add_table<S: AsRef<str>>(&mut self, table: &Table, platforms: &[S]) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::DatabaseInitialized);
        }
        let columns = table.sql_columns(platforms)?;
        if columns.is_empty() {
            tracing::warn!(table = %table.name, "Table has no columns for this platform, skipping");
            self.tables.remove(&table.name);
            return Ok(());
        }
        tracing::debug!(table = %table.name, columns = columns.len(), "Table registered");
        self.tables.insert(table.name.clone(), columns);
        Ok(())
    }

    /// Create every registered table and lock the manifest.
    pub fn initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::DatabaseInitialized);
        }

        let conn = Connection::open_in_memory()?;
        for (name, columns) in &self.tables {
            conn.execute(&create_table_sql(name, columns), [])?;
        }
        tracing::info!(database = %self.name, tables = self.tables.len(), "Database initialized");
        self.conn = Some(conn);
        Ok(())
    }

    /// Initialised database holding every table of the namespaces that
    /// apply to `os`, with the extended columns registered for `os`.
    pub fn from_catalog(catalog: &Catalog, os: &str) -> Result<Self> {
        let mut db = Database::default();
        for table in catalog.tables_for_os(os)? {
            db.add_table(&table, &[os])
                .map_err(|e| e.in_file(format!("{}/{}", table.namespace.key, table.name)))?;
        }
        db.initialize()?;
        Ok(db)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Registered columns of one table.
    pub fn schema(&self, table: &str) -> Option<&[SqlColumn]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.conn.as_ref().ok_or(Error::DatabaseNotInitialized)?;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(json_value(row.get_ref(idx)?));
            }
            rows.push(values);
        }
        Ok(QueryResult { columns, rows })
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_NAME)
    }
}

fn create_table_sql(name: &str, columns: &[SqlColumn]) -> String {
    let mut seen = HashSet::new();
    let mut defs = Vec::with_capacity(columns.len());
    for col in columns {
        if !seen.insert(col.name.as_str()) {
            tracing::warn!(table = name, column = %col.name, "Duplicate column name, keeping the first");
            continue;
        }
        let mut def = format!("{} {}", quote_ident(&col.name), col.sql_type.sqlite_decl());
        if !col.nullable {
            def.push_str(" NOT NULL");
        }
        defs.push(def);
    }
    format!("CREATE TABLE {} ({})", quote_ident(name), defs.join(", "))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(bytes.iter().map(|b| format!("{:02x}", b)).collect()),
    }
}
