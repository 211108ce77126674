//! # osqt - osquery table toolkit
//!
//! Structured schema extraction for osquery `.table` specification files.
//!
//! osqt provides:
//! - A lowering of tree-sitter Python syntax into a small, closed node set
//! - A typed declaration pre-pass and a table extractor over it
//! - Namespace/Table/Schema/Column models that export to JSON and YAML
//! - A concurrent directory ingestion pipeline with a single aggregator
//! - A virtual relational database built from the extracted column types

pub mod value;
pub mod syntax;
pub mod platform;
pub mod column;
pub mod schema;
pub mod table;
pub mod extract;
pub mod namespace;
pub mod catalog;
pub mod ingest;
pub mod vdb;
pub mod server;
pub mod config;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use value::{Literal, Scalar};
pub use column::{Column, SqlColumn, SqlType};
pub use schema::Schema;
pub use table::Table;
pub use namespace::Namespace;
pub use catalog::Catalog;
pub use ingest::{IngestOptions, Ingestor, SourceFile};
pub use vdb::Database;

/// Result type alias for osqt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for osqt operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node did not have the shape its position requires.
    #[error("{context}: expected {expected}, found {found}")]
    Shape {
        context: String,
        expected: &'static str,
        found: String,
    },

    /// A key was missing from one of the static platform tables.
    #[error("no entry for {key:?} in {table}")]
    Lookup { key: String, table: &'static str },

    #[error("schema is already defined for table {table:?}")]
    DuplicateSchema { table: String },

    #[error("syntax error in {path}: {message}")]
    Syntax { path: String, message: String },

    /// Any extraction failure, tagged with the file it came from.
    #[error("{}: {source}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("unsupported type {type_name} for column {column}")]
    UnknownColumnType { column: String, type_name: String },

    #[error("database has already been initialized and cannot be modified")]
    DatabaseInitialized,

    #[error("database must be initialized first")]
    DatabaseNotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Grammar error: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl Error {
    pub(crate) fn shape(context: impl Into<String>, expected: &'static str, found: &syntax::Node) -> Self {
        Error::Shape {
            context: context.into(),
            expected,
            found: found.describe().to_string(),
        }
    }

    pub(crate) fn missing(context: impl Into<String>, expected: &'static str) -> Self {
        Error::Shape {
            context: context.into(),
            expected,
            found: "nothing".to_string(),
        }
    }

    /// Attach the originating file path, unless one is already attached.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Extract { .. } => self,
            other => Error::Extract {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

/// Message sent from parse workers to the aggregator
#[derive(Debug)]
pub enum IngestMessage {
    Parsed(SourceFile),
    Failed(Error),
}
