//! Platform tables and resolution
//!
//! Three fixed tables drive platform applicability:
//! - canonical spec sub-directories and their descriptions
//! - which of those directories apply to a given OS
//! - the categories (`WINDOWS`, `POSIX`, ...) used by `extended_schema`

use crate::syntax::{BoolOperator, Node};
use crate::value::Literal;
use crate::{Error, Result};

pub const CANONICAL_PLATFORMS_TABLE: &str = "canonical platforms";
pub const OS_NAMESPACES_TABLE: &str = "OS namespaces";
pub const TABLE_CATEGORIES_TABLE: &str = "table categories";

/// Spec sub-directory names and their human descriptions.
pub const CANONICAL_PLATFORMS: &[(&str, &str)] = &[
    ("specs", "All Platforms"),
    ("darwin", "Darwin (Apple OS X)"),
    ("linux", "Ubuntu, CentOS"),
    ("freebsd", "FreeBSD"),
    ("posix", "POSIX-compatible Plaforms"),
    ("windows", "Microsoft Windows"),
    ("utility", "Utility"),
    ("yara", "YARA"),
    ("smart", "SMART"),
    ("lldpd", "LLDPD"),
    ("sleuthkit", "The Sleuth Kit"),
    ("macwin", "MacOS and Windows"),
    ("linwin", "Linux and Windows"),
];

/// Namespaces that apply when targeting an OS.
pub const OS_NAMESPACES: &[(&str, &[&str])] = &[
    (
        "linux",
        &["specs", "linux", "posix", "utility", "yara", "smart", "lldpd", "sleuthkit", "linwin"],
    ),
    (
        "darwin",
        &["specs", "posix", "utility", "darwin", "yara", "smart", "lldpd", "sleuthkit", "macwin"],
    ),
    (
        "windows",
        &["specs", "windows", "utility", "yara", "smart", "sleuthkit", "macwin", "linwin"],
    ),
    (
        "freebsd",
        &["specs", "freebsd", "posix", "utility", "yara", "smart", "lldpd"],
    ),
];

/// Category identifiers and the platform keys they expand to.
pub const TABLE_CATEGORIES: &[(&str, &[&str])] = &[
    ("WINDOWS", &["windows", "win32", "cygwin"]),
    ("LINUX", &["linux"]),
    ("POSIX", &["linux", "darwin", "freebsd"]),
    ("DARWIN", &["darwin"]),
    ("FREEBSD", &["freebsd"]),
];

/// Description for a spec directory name.
pub fn platform_description(key: &str) -> Result<&'static str> {
    CANONICAL_PLATFORMS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, desc)| *desc)
        .ok_or_else(|| Error::Lookup {
            key: key.to_string(),
            table: CANONICAL_PLATFORMS_TABLE,
        })
}

pub fn applicable_namespaces(os: &str) -> Result<&'static [&'static str]> {
    OS_NAMESPACES
        .iter()
        .find(|(k, _)| *k == os)
        .map(|(_, namespaces)| *namespaces)
        .ok_or_else(|| Error::Lookup {
            key: os.to_string(),
            table: OS_NAMESPACES_TABLE,
        })
}

pub fn category_platforms(category: &str) -> Result<&'static [&'static str]> {
    TABLE_CATEGORIES
        .iter()
        .find(|(k, _)| *k == category)
        .map(|(_, platforms)| *platforms)
        .ok_or_else(|| Error::Lookup {
            key: category.to_string(),
            table: TABLE_CATEGORIES_TABLE,
        })
}

/// OS name of the running host, spelled the way [`OS_NAMESPACES`] spells it.
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Resolve the platform argument of `extended_schema(...)`.
///
/// Accepts a string, a bare identifier, a named constant or a lambda whose
/// body ORs category calls.
pub fn resolve_platform_arg(node: &Node) -> Result<Vec<&'static str>> {
    if let Node::Lambda(body) = node {
        return resolve_lambda(body);
    }
    match Literal::from_node(node) {
        Some(lit) => Ok(category_platforms(&lit.as_key())?.to_vec()),
        None => Err(Error::shape(
            "extended_schema platform argument",
            "string, name, constant or lambda",
            node,
        )),
    }
}

/// Resolve `lambda: WINDOWS() or LINUX()` into the union of its categories.
pub fn resolve_lambda(body: &Node) -> Result<Vec<&'static str>> {
    let values = match body {
        Node::BoolOp { op: BoolOperator::Or, values } => values,
        other => return Err(Error::shape("lambda body", "boolean OR", other)),
    };

    let mut platforms = Vec::new();
    for (idx, value) in values.iter().enumerate() {
        let context = format!("lambda OR operand {}", idx);
        let call = match value {
            Node::Call(call) => call,
            other => return Err(Error::shape(context, "call", other)),
        };
        let category = match call.func.as_ref() {
            Node::Name(id) => id,
            other => return Err(Error::shape(context, "call to a bare name", other)),
        };
        if let Some(arg) = call.args.first() {
            return Err(Error::shape(context, "zero-argument call", arg));
        }
        if let Some(kw) = call.keywords.first() {
            return Err(Error::shape(context, "zero-argument call", &kw.value));
        }
        for platform in category_platforms(category)? {
            if !platforms.contains(platform) {
                platforms.push(*platform);
            }
        }
    }
    Ok(platforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Call, NameConstant};

    fn category_call(name: &str) -> Node {
        Node::Call(Call {
            func: Box::new(Node::Name(name.to_string())),
            args: vec![],
            keywords: vec![],
        })
    }

    #[test]
    fn test_static_tables() {
        assert_eq!(CANONICAL_PLATFORMS.len(), 13);
        assert_eq!(OS_NAMESPACES.len(), 4);
        assert_eq!(TABLE_CATEGORIES.len(), 5);

        assert_eq!(platform_description("specs").unwrap(), "All Platforms");
        assert!(applicable_namespaces("freebsd").unwrap().contains(&"posix"));
        assert_eq!(category_platforms("POSIX").unwrap(), &["linux", "darwin", "freebsd"]);
    }

    #[test]
    fn test_lookup_errors_name_the_table() {
        match platform_description("plan9").unwrap_err() {
            Error::Lookup { key, table } => {
                assert_eq!(key, "plan9");
                assert_eq!(table, CANONICAL_PLATFORMS_TABLE);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(
            applicable_namespaces("haiku"),
            Err(Error::Lookup { table: OS_NAMESPACES_TABLE, .. })
        ));
    }

    #[test]
    fn test_resolve_literal_shapes() {
        assert_eq!(resolve_platform_arg(&Node::Name("LINUX".into())).unwrap(), vec!["linux"]);
        assert_eq!(resolve_platform_arg(&Node::Str("DARWIN".into())).unwrap(), vec!["darwin"]);

        let constant = Node::NameConstant(NameConstant::True);
        assert!(matches!(
            resolve_platform_arg(&constant),
            Err(Error::Lookup { ref key, .. }) if key == "True"
        ));

        assert!(matches!(
            resolve_platform_arg(&Node::List(vec![])),
            Err(Error::Shape { .. })
        ));
    }

    #[test]
    fn test_resolve_lambda_unions_without_duplicates() {
        let body = Node::BoolOp {
            op: BoolOperator::Or,
            values: vec![category_call("POSIX"), category_call("LINUX")],
        };
        let platforms = resolve_platform_arg(&Node::Lambda(Box::new(body))).unwrap();
        assert_eq!(platforms, vec!["linux", "darwin", "freebsd"]);
    }

    #[test]
    fn test_resolve_lambda_rejects_bad_shapes() {
        let and = Node::BoolOp {
            op: BoolOperator::And,
            values: vec![category_call("LINUX"), category_call("DARWIN")],
        };
        assert!(matches!(resolve_lambda(&and), Err(Error::Shape { .. })));

        let with_arg = Node::BoolOp {
            op: BoolOperator::Or,
            values: vec![Node::Call(Call {
                func: Box::new(Node::Name("LINUX".into())),
                args: vec![Node::Str("x".into())],
                keywords: vec![],
            })],
        };
        assert!(matches!(resolve_lambda(&with_arg), Err(Error::Shape { .. })));

        let unknown = Node::BoolOp {
            op: BoolOperator::Or,
            values: vec![category_call("SOLARIS")],
        };
        assert!(matches!(
            resolve_lambda(&unknown),
            Err(Error::Lookup { table: TABLE_CATEGORIES_TABLE, .. })
        ));
    }
}
