//! Catalog - the aggregate of every extracted namespace
//!
//! The catalog is the only owner of namespaces. During ingestion it is
//! mutated by the aggregator alone; afterwards it is exported or handed
//! to the virtual database.
//!
//! The wire format is the bare `namespace key -> Namespace` map. Owner
//! links (table to namespace) are not stored as pointers: `namespace_id`
//! names the owner and [`Catalog::namespace_of`] resolves it. Loading a
//! document re-derives those keys from the map structure.

use crate::ingest::SourceFile;
use crate::namespace::Namespace;
use crate::platform;
use crate::table::Table;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    namespaces: BTreeMap<String, Namespace>,
}

/// A table together with the namespace that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    pub namespace: &'a Namespace,
    pub table: &'a Table,
}

impl std::ops::Deref for TableRef<'_> {
    type Target = Table;

    fn deref(&self) -> &Table {
        self.table
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parsed file under the namespace named by its parent directory.
    pub fn record(&mut self, source: SourceFile) -> Result<()> {
        let namespace_id = source
            .path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let ns = match self.namespaces.entry(namespace_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let ns = Namespace::new(&namespace_id).map_err(|e| e.in_file(&source.path))?;
                entry.insert(ns)
            }
        };

        tracing::debug!(
            table = %source.table.name,
            nsid = %namespace_id,
            ns = %ns.name,
            "Table recorded"
        );
        ns.insert(source.table);
        Ok(())
    }

    /// Wire up tables loaded from an exported document.
    pub fn inject(&mut self, raw: BTreeMap<String, Namespace>) {
        for (nsid, mut ns) in raw {
            if ns.key.is_empty() {
                ns.key = nsid.clone();
            }
            for (tname, table) in ns.tables.iter_mut() {
                if table.namespace_id.is_empty() {
                    table.namespace_id = nsid.clone();
                }
                if table.name.is_empty() {
                    table.name = tname.clone();
                }
            }
            self.namespaces.insert(nsid, ns);
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Namespace> = serde_json::from_str(json)?;
        let mut catalog = Catalog::new();
        catalog.inject(raw);
        Ok(catalog)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: BTreeMap<String, Namespace> = serde_yaml::from_str(yaml)?;
        let mut catalog = Catalog::new();
        catalog.inject(raw);
        Ok(catalog)
    }

    /// Load a previously exported `.json`, `.yaml` or `.yml` document.
    pub fn load_schema_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "json" => Self::from_json_str(&contents),
            "yaml" | "yml" => Self::from_yaml_str(&contents),
            other => Err(Error::Lookup {
                key: other.to_string(),
                table: "schema file formats (json, yaml, yml)",
            }
            .in_file(path)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn namespace(&self, key: &str) -> Option<&Namespace> {
        self.namespaces.get(key)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    /// Owning namespace of a table.
    pub fn namespace_of(&self, table: &Table) -> Option<&Namespace> {
        self.namespaces.get(&table.namespace_id)
    }

    pub fn table(&self, namespace: &str, name: &str) -> Option<TableRef<'_>> {
        let ns = self.namespaces.get(namespace)?;
        let table = ns.tables.get(name)?;
        Some(TableRef { namespace: ns, table })
    }

    /// Every table in every namespace.
    pub fn tables(&self) -> impl Iterator<Item = TableRef<'_>> {
        self.namespaces.values().flat_map(|ns| {
            ns.tables
                .values()
                .map(move |table| TableRef { namespace: ns, table })
        })
    }

    /// Tables from the namespaces that apply to `os`.
    pub fn tables_for_os(&self, os: &str) -> Result<Vec<TableRef<'_>>> {
        let mut tables = Vec::new();
        for nsid in platform::applicable_namespaces(os)? {
            let Some(ns) = self.namespaces.get(*nsid) else {
                tracing::debug!(nsid, "Namespace not present in catalog");
                continue;
            };
            tables.extend(ns.tables.values().map(|table| TableRef { namespace: ns, table }));
        }
        Ok(tables)
    }

    pub fn table_count(&self) -> usize {
        self.namespaces.values().map(Namespace::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::schema::Schema;
    use crate::value::Scalar;
    use std::path::PathBuf;

    fn source(path: &str, name: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            table: Table::new(name),
        }
    }

    fn rich_table() -> Table {
        let mut table = Table::new("users");
        table.aliases = vec!["accounts".into()];
        table.description = "Local user accounts.".into();
        table.implementation = "users@genUsers".into();
        table.attributes.insert("cacheable".into(), Scalar::Bool(true));
        table.schema = Some(Schema {
            columns: vec![Column {
                index: 0,
                name: "uid".into(),
                type_name: "BIGINT".into(),
                options: [("index".to_string(), Scalar::Bool(true))].into_iter().collect(),
                ..Column::default()
            }],
            ..Schema::default()
        });
        let mut ext = Schema { extended: true, ..Schema::default() };
        ext.merge_category("WINDOWS").unwrap();
        ext.columns.push(Column {
            index: 0,
            name: "uuid".into(),
            type_name: "TEXT".into(),
            ..Column::default()
        });
        table.extended_schemas.insert("windows".into(), ext);
        table
    }

    #[test]
    fn test_same_name_in_two_directories() {
        let mut catalog = Catalog::new();
        catalog.record(source("specs/linux/foo.table", "foo")).unwrap();
        catalog.record(source("specs/darwin/foo.table", "foo")).unwrap();

        assert_eq!(catalog.table_count(), 2);
        assert_eq!(catalog.table("linux", "foo").unwrap().namespace_id, "linux");
        assert_eq!(catalog.table("darwin", "foo").unwrap().namespace_id, "darwin");
        assert_eq!(catalog.namespace("darwin").unwrap().name, "Darwin (Apple OS X)");
    }

    #[test]
    fn test_record_rejects_unknown_directory() {
        let mut catalog = Catalog::new();
        let err = catalog.record(source("specs/plan9/foo.table", "foo")).unwrap_err();
        match err {
            Error::Extract { path, source } => {
                assert_eq!(path, PathBuf::from("specs/plan9/foo.table"));
                assert!(matches!(*source, Error::Lookup { .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_round_trip_restores_owners() {
        let mut catalog = Catalog::new();
        catalog
            .record(SourceFile {
                path: PathBuf::from("specs/posix/users.table"),
                table: rich_table(),
            })
            .unwrap();
        catalog.record(source("specs/specs/time.table", "time")).unwrap();

        let json = catalog.to_json().unwrap();
        let from_json = Catalog::from_json_str(&json).unwrap();
        assert_eq!(from_json, catalog);

        let yaml = catalog.to_yaml().unwrap();
        let from_yaml = Catalog::from_yaml_str(&yaml).unwrap();
        assert_eq!(from_yaml, catalog);

        let users = from_yaml.table("posix", "users").unwrap();
        assert_eq!(from_yaml.namespace_of(&users).unwrap().key, "posix");
        assert_eq!(users.namespace.name, "POSIX-compatible Plaforms");
    }

    #[test]
    fn test_inject_fills_missing_keys() {
        let json = r#"{
            "linux": {
                "name": "Ubuntu, CentOS",
                "tables": {
                    "iptables": { "description": "Linux IP packet filtering." }
                }
            }
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();

        let ns = catalog.namespace("linux").unwrap();
        assert_eq!(ns.key, "linux");
        let table = ns.table("iptables").unwrap();
        assert_eq!(table.name, "iptables");
        assert_eq!(table.namespace_id, "linux");
        assert!(table.schema.is_none());
    }

    #[test]
    fn test_tables_for_os() {
        let mut catalog = Catalog::new();
        catalog.record(source("s/linux/iptables.table", "iptables")).unwrap();
        catalog.record(source("s/darwin/apps.table", "apps")).unwrap();
        catalog.record(source("s/posix/users.table", "users")).unwrap();

        let mut names: Vec<&str> = catalog
            .tables_for_os("linux")
            .unwrap()
            .into_iter()
            .map(|t| t.table.name.as_str())
            .collect();
        names.sort();
        assert_eq!(names, vec!["iptables", "users"]);

        assert!(matches!(catalog.tables_for_os("beos"), Err(Error::Lookup { .. })));
    }
}
