//! Table extraction
//!
//! Turns a lowered `.table` module into a [`Table`]: the declaration
//! pre-pass classifies calls, the extractor applies them in file order.

pub mod decl;
pub mod extractor;

pub use decl::{Declaration, declarations};
pub use extractor::TableExtractor;

use crate::syntax::Node;
use crate::table::Table;
use crate::Result;

/// Extract the table declared by `module`.
///
/// `name` is the provisional table name; `table_name(...)` overrides it.
/// The first failing declaration aborts the whole extraction.
pub fn extract_table(name: &str, module: &Node) -> Result<Table> {
    let mut extractor = TableExtractor::new(name);
    for decl in declarations(module) {
        extractor.apply(&decl)?;
    }
    Ok(extractor.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceParser;
    use crate::value::Scalar;
    use crate::Error;

    fn extract(src: &str) -> Result<Table> {
        let module = SourceParser::new().unwrap().parse("test.table", src)?;
        extract_table("test", &module)
    }

    #[test]
    fn test_groups_table() {
        let table = extract(
            r#"
table_name("groups")
description("Local system groups.")
schema([
    Column("gid", BIGINT, "Unsigned int64 group ID", index=True),
    Column("gid_signed", BIGINT, "A signed int64 version of gid"),
])
implementation("groups@genGroups")
"#,
        )
        .unwrap();

        assert_eq!(table.name, "groups");
        assert_eq!(table.description, "Local system groups.");
        assert_eq!(table.implementation, "groups@genGroups");

        let schema = table.schema.as_ref().unwrap();
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].index, 0);
        assert_eq!(schema.columns[1].index, 1);
        assert!(schema.columns.iter().all(|c| c.type_name == "BIGINT"));
        assert_eq!(schema.columns[0].options.get("index"), Some(&Scalar::Bool(true)));
        assert!(schema.columns[1].options.is_empty());
    }

    #[test]
    fn test_file_stem_is_default_name() {
        let table = extract(r#"description("No table_name here.")"#).unwrap();
        assert_eq!(table.name, "test");
    }

    #[test]
    fn test_aliases_attributes_and_lists() {
        let table = extract(
            r#"
table_name("processes", aliases=["proc", 7, "ps"])
attributes(cacheable=True, event_subscriber=False, owner=root, note="x", weight=3)
fuzz_paths(["/proc", "/sys"])
examples(["select * from processes", "select pid from processes"])
"#,
        )
        .unwrap();

        assert_eq!(table.aliases, vec!["proc", "ps"]);
        assert_eq!(table.attributes.get("cacheable"), Some(&Scalar::Bool(true)));
        assert_eq!(table.attributes.get("event_subscriber"), Some(&Scalar::Bool(false)));
        assert_eq!(table.attributes.get("owner"), Some(&Scalar::String("root".into())));
        assert!(!table.attributes.contains_key("weight"));
        assert_eq!(table.fuzz_paths, vec!["/proc", "/sys"]);
        assert_eq!(table.examples.len(), 2);
    }

    #[test]
    fn test_extended_schema_registered_per_platform() {
        let table = extract(
            r#"
table_name("file")
schema([Column("path", TEXT, "Path")])
extended_schema(lambda: WINDOWS() or LINUX(), [Column("attributes", TEXT, "Attributes")])
extended_schema(DARWIN, [Column("bsd_flags", TEXT, "BSD flags")])
"#,
        )
        .unwrap();

        let keys: Vec<&str> = table.extended_schemas.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["cygwin", "darwin", "linux", "win32", "windows"]);
        assert_eq!(table.extended_schemas["linux"].columns[0].name, "attributes");
        assert_eq!(table.extended_schemas["darwin"].columns[0].name, "bsd_flags");
        assert!(table.extended_schemas.values().all(|s| s.extended));
    }

    #[test]
    fn test_later_extended_schema_overwrites_platform() {
        let table = extract(
            r#"
extended_schema(POSIX, [Column("a", TEXT, "")])
extended_schema(LINUX, [Column("b", TEXT, "")])
"#,
        )
        .unwrap();

        assert_eq!(table.extended_schemas["linux"].columns[0].name, "b");
        assert_eq!(table.extended_schemas["darwin"].columns[0].name, "a");
    }

    #[test]
    fn test_duplicate_schema_is_an_error() {
        let err = extract(
            r#"
table_name("dup")
schema([Column("a", TEXT, "")])
schema([Column("b", TEXT, "")])
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateSchema { ref table } if table == "dup"));
    }

    #[test]
    fn test_malformed_lists_abort() {
        let err = extract(r#"fuzz_paths(["/ok", 42])"#).unwrap_err();
        match err {
            Error::Shape { context, expected, found } => {
                assert_eq!(context, "fuzz_paths list element 1");
                assert_eq!(expected, "string");
                assert_eq!(found, "integer");
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(matches!(extract(r#"examples("select 1")"#), Err(Error::Shape { .. })));
        assert!(matches!(extract("table_name(groups)"), Err(Error::Shape { .. })));
        assert!(matches!(extract("description()"), Err(Error::Shape { .. })));
    }

    #[test]
    fn test_unknown_calls_are_ignored() {
        let table = extract(
            r#"
table_name("t")
notes("ignored")
os.path.join("a", "b")
"#,
        )
        .unwrap();
        assert_eq!(table.name, "t");
        assert!(table.schema.is_none());
    }
}
