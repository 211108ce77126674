use crate::catalog::TableRef;
use crate::column::Column;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableListing {
    #[tabled(rename = "Namespace")]
    pub namespace: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Columns")]
    pub columns: usize,
    #[tabled(rename = "Extended")]
    pub extended: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl TableListing {
    pub fn from_ref(table: &TableRef<'_>) -> Self {
        let extended: Vec<&str> = table.extended_schemas.keys().map(String::as_str).collect();
        Self {
            namespace: table.namespace.key.clone(),
            table: table.name.clone(),
            columns: table.column_count(),
            extended: extended.join(", "),
            description: truncate(&table.description, 60),
        }
    }
}

#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Column")]
    name: String,
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Options")]
    options: String,
}

pub fn catalog_table<'a>(tables: impl IntoIterator<Item = TableRef<'a>>) -> String {
    let rows: Vec<TableListing> = tables.into_iter().map(|t| TableListing::from_ref(&t)).collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn columns_table(columns: &[Column]) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let rows: Vec<ColumnRow> = columns
        .iter()
        .map(|c| ColumnRow {
            index: c.index,
            name: c.name.clone(),
            type_name: c.type_name.clone(),
            options: c
                .options
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ingest::SourceFile;
    use crate::schema::Schema;
    use crate::table::Table as SpecTable;
    use crate::value::Scalar;
    use std::path::PathBuf;

    #[test]
    fn test_catalog_table_lists_every_table() {
        let mut users = SpecTable::new("users");
        users.description = "Local user accounts (including domain accounts that have logged on locally (Windows)).".into();
        users.schema = Some(Schema {
            columns: vec![Column::default(), Column::default()],
            ..Schema::default()
        });
        users.extended_schemas.insert("windows".into(), Schema::default());

        let mut catalog = Catalog::new();
        catalog
            .record(SourceFile { path: PathBuf::from("specs/posix/users.table"), table: users })
            .unwrap();
        catalog
            .record(SourceFile {
                path: PathBuf::from("specs/linux/iptables.table"),
                table: SpecTable::new("iptables"),
            })
            .unwrap();

        let rendered = catalog_table(catalog.tables());
        assert!(rendered.contains("Namespace"));
        assert!(rendered.contains("posix"));
        assert!(rendered.contains("iptables"));
        assert!(rendered.contains("windows"));
        assert!(rendered.contains('…'));
        assert!(catalog_table(Vec::new()).is_empty());
    }

    #[test]
    fn test_columns_table_shows_options() {
        let mut col = Column::default();
        col.name = "pid".into();
        col.type_name = "BIGINT".into();
        col.options.insert("index".into(), Scalar::Bool(true));

        let rendered = columns_table(&[col]);
        assert!(rendered.contains("pid"));
        assert!(rendered.contains("BIGINT"));
        assert!(rendered.contains("index=true"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
