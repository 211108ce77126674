//! Column model and relational type mapping

use crate::syntax::Call;
use crate::value::{Literal, Scalar};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One column of an osquery table schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Zero-based declaration order within the owning schema
    pub index: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Declared type token (`TEXT`, `BIGINT`, ...), kept verbatim
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Scalar>,
}

impl Column {
    /// Create an empty column
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a column from a `Column(name, TYPE, "description", **options)` call.
    ///
    /// Positional arguments of the wrong shape are left empty.
    pub fn from_call(call: &Call, index: usize) -> Self {
        let mut col = Column::new();
        col.index = index;

        if let Some(name) = call.arg(0).and_then(|n| n.as_str()) {
            col.name = name.to_string();
        }
        if let Some(type_name) = call.arg(1).and_then(|n| n.as_name()) {
            col.type_name = type_name.to_string();
        }
        if let Some(desc) = call.arg(2).and_then(|n| n.as_str()) {
            col.description = desc.to_string();
        }

        for kw in &call.keywords {
            if let Some(lit) = Literal::from_node(&kw.value) {
                col.options.insert(kw.arg.clone(), lit.to_scalar());
            }
        }
        col
    }

    /// Option lookup; `index=True` etc.
    pub fn flag(&self, option: &str) -> bool {
        self.options.get(option).and_then(Scalar::as_bool).unwrap_or(false)
    }

    pub fn sql_type(&self) -> Result<SqlType> {
        self.type_name.parse().map_err(|_| Error::UnknownColumnType {
            column: self.name.clone(),
            type_name: self.type_name.clone(),
        })
    }

    /// Column descriptor for the relational engine.
    pub fn to_sql(&self, table: &str) -> Result<SqlColumn> {
        Ok(SqlColumn {
            name: self.name.clone(),
            source: table.to_string(),
            sql_type: self.sql_type()?,
            nullable: true,
        })
    }
}

/// Primitive types of the relational engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Text,
    Date,
    Timestamp,
    Int32,
    Int64,
    Uint64,
    Float64,
    Blob,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Text => "text",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
            SqlType::Int32 => "int32",
            SqlType::Int64 => "int64",
            SqlType::Uint64 => "uint64",
            SqlType::Float64 => "float64",
            SqlType::Blob => "blob",
        }
    }

    /// Column declaration used when materialising the table in SQLite.
    pub fn sqlite_decl(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "DATETIME",
            SqlType::Int32 | SqlType::Int64 | SqlType::Uint64 => "INTEGER",
            SqlType::Float64 => "REAL",
            SqlType::Blob => "BLOB",
        }
    }
}

impl std::str::FromStr for SqlType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "TEXT" => Ok(SqlType::Text),
            "DATE" => Ok(SqlType::Date),
            "DATETIME" => Ok(SqlType::Timestamp),
            "INTEGER" => Ok(SqlType::Int32),
            "BIGINT" => Ok(SqlType::Int64),
            "UNSIGNED_BIGINT" => Ok(SqlType::Uint64),
            "DOUBLE" => Ok(SqlType::Float64),
            "BLOB" => Ok(SqlType::Blob),
            other => Err(format!("unknown column type token: {}", other)),
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column as registered with the relational engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlColumn {
    pub name: String,
    /// Owning table name
    pub source: String,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    pub nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Keyword, NameConstant, Node};

    #[test]
    fn test_type_mapping() {
        let cases = [
            ("TEXT", SqlType::Text),
            ("DATE", SqlType::Date),
            ("DATETIME", SqlType::Timestamp),
            ("INTEGER", SqlType::Int32),
            ("BIGINT", SqlType::Int64),
            ("UNSIGNED_BIGINT", SqlType::Uint64),
            ("DOUBLE", SqlType::Float64),
            ("BLOB", SqlType::Blob),
        ];
        for (token, expected) in cases {
            let col = Column {
                name: "c".into(),
                type_name: token.into(),
                ..Column::default()
            };
            let sql = col.to_sql("groups").unwrap();
            assert_eq!(sql.sql_type, expected);
            assert_eq!(sql.source, "groups");
            assert!(sql.nullable);
        }
    }

    #[test]
    fn test_unknown_type_fails_only_at_mapping() {
        let col = Column {
            name: "future".into(),
            type_name: "UUID".into(),
            ..Column::default()
        };
        // Still exportable
        assert!(serde_json::to_string(&col).unwrap().contains("\"type\":\"UUID\""));

        match col.to_sql("t").unwrap_err() {
            Error::UnknownColumnType { column, type_name } => {
                assert_eq!(column, "future");
                assert_eq!(type_name, "UUID");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_from_call() {
        let call = Call {
            func: Box::new(Node::Name("Column".into())),
            args: vec![
                Node::Str("gid".into()),
                Node::Name("BIGINT".into()),
                Node::Str("Unique group ID".into()),
            ],
            keywords: vec![
                Keyword { arg: "index".into(), value: Node::NameConstant(NameConstant::True) },
                Keyword { arg: "collate".into(), value: Node::Name("nocase".into()) },
                Keyword { arg: "width".into(), value: Node::Other("integer") },
            ],
        };
        let col = Column::from_call(&call, 3);

        assert_eq!(col.index, 3);
        assert_eq!(col.name, "gid");
        assert_eq!(col.type_name, "BIGINT");
        assert_eq!(col.description, "Unique group ID");
        assert!(col.flag("index"));
        assert_eq!(col.options.get("collate"), Some(&Scalar::String("nocase".into())));
        assert!(!col.options.contains_key("width"));
    }
}
