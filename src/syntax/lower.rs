//! Tree-sitter lowering
//!
//! Parses Python source with tree-sitter and converts the concrete syntax
//! tree into [`Node`]s.

use super::{BoolOperator, Call, Keyword, NameConstant, Node};
use crate::{Error, Result};
use tree_sitter::{Node as TsNode, Parser};

/// Python parser for spec sources
///
/// Holds one tree-sitter parser; not shareable across threads, so each
/// ingestion worker owns its own.
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse `content` into a [`Node::Module`].
    ///
    /// `origin` only labels syntax errors.
    pub fn parse(&mut self, origin: &str, content: &str) -> Result<Node> {
        let tree = self.parser.parse(content, None).ok_or_else(|| Error::Syntax {
            path: origin.to_string(),
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(bad) => format!(
                    "invalid syntax at line {}, column {}",
                    bad.start_position().row + 1,
                    bad.start_position().column + 1
                ),
                None => "invalid syntax".to_string(),
            };
            return Err(Error::Syntax {
                path: origin.to_string(),
                message,
            });
        }

        Ok(lower(root, content.as_bytes()))
    }
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn named_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn text<'s>(node: TsNode, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Convert one tree-sitter node (and its subtree).
pub fn lower(node: TsNode, source: &[u8]) -> Node {
    match node.kind() {
        "module" => Node::Module(
            named_children(node)
                .into_iter()
                .map(|c| lower(c, source))
                .collect(),
        ),
        "expression_statement" | "parenthesized_expression" => {
            let children = named_children(node);
            match children.as_slice() {
                [only] => lower(*only, source),
                _ => Node::Other(node.kind()),
            }
        }
        "call" => lower_call(node, source),
        "identifier" => Node::Name(text(node, source).to_string()),
        "string" => Node::Str(decode_string(text(node, source))),
        "concatenated_string" => {
            let mut joined = String::new();
            for piece in named_children(node) {
                joined.push_str(&decode_string(text(piece, source)));
            }
            Node::Str(joined)
        }
        "true" => Node::NameConstant(NameConstant::True),
        "false" => Node::NameConstant(NameConstant::False),
        "none" => Node::NameConstant(NameConstant::None),
        "list" => Node::List(
            named_children(node)
                .into_iter()
                .map(|c| lower(c, source))
                .collect(),
        ),
        "lambda" => match node.child_by_field_name("body") {
            Some(body) => Node::Lambda(Box::new(lower(body, source))),
            None => Node::Other("lambda"),
        },
        "boolean_operator" => lower_bool_op(node, source),
        other => Node::Other(other),
    }
}

fn lower_call(node: TsNode, source: &[u8]) -> Node {
    let func = match node.child_by_field_name("function") {
        Some(f) => lower(f, source),
        None => return Node::Other("call"),
    };

    let mut args = Vec::new();
    let mut keywords = Vec::new();
    if let Some(arguments) = node.child_by_field_name("arguments") {
        if arguments.kind() == "argument_list" {
            for arg in named_children(arguments) {
                if arg.kind() == "keyword_argument" {
                    let name = arg.child_by_field_name("name").map(|n| text(n, source));
                    let value = arg.child_by_field_name("value");
                    if let (Some(name), Some(value)) = (name, value) {
                        keywords.push(Keyword {
                            arg: name.to_string(),
                            value: lower(value, source),
                        });
                    }
                } else {
                    args.push(lower(arg, source));
                }
            }
        } else {
            // f(x for x in y)
            args.push(Node::Other(arguments.kind()));
        }
    }

    Node::Call(Call {
        func: Box::new(func),
        args,
        keywords,
    })
}

fn lower_bool_op(node: TsNode, source: &[u8]) -> Node {
    let op = match node.child_by_field_name("operator").map(|o| o.kind()) {
        Some("and") => BoolOperator::And,
        Some("or") => BoolOperator::Or,
        _ => return Node::Other("boolean_operator"),
    };

    let mut values = Vec::new();
    for side in ["left", "right"] {
        let Some(operand) = node.child_by_field_name(side) else {
            return Node::Other("boolean_operator");
        };
        // `a or b or c` nests on the left; flatten it like Python's own AST.
        match lower(operand, source) {
            Node::BoolOp { op: inner, values: nested }
                if inner == op && operand.kind() == "boolean_operator" =>
            {
                values.extend(nested)
            }
            lowered => values.push(lowered),
        }
    }

    Node::BoolOp { op, values }
}

/// Strip prefix and quotes from a Python string literal and decode escapes.
pub fn decode_string(raw: &str) -> String {
    let prefix_len = raw
        .char_indices()
        .find(|(_, c)| *c == '"' || *c == '\'')
        .map(|(i, _)| i)
        .unwrap_or(0);
    let (prefix, quoted) = raw.split_at(prefix_len);
    let is_raw = prefix.contains(['r', 'R']);

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    let body = if quoted.len() >= quote_len * 2 {
        &quoted[quote_len..quoted.len() - quote_len]
    } else {
        ""
    };

    if is_raw { body.to_string() } else { unescape(body) }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('x') => push_code_point(&mut out, &mut chars, 2, 'x'),
            Some('u') => push_code_point(&mut out, &mut chars, 4, 'u'),
            Some('U') => push_code_point(&mut out, &mut chars, 8, 'U'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point<I>(out: &mut String, chars: &mut std::iter::Peekable<I>, digits: usize, marker: char)
where
    I: Iterator<Item = char>,
{
    let mut hex = String::new();
    while hex.len() < digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(ch) if hex.len() == digits => out.push(ch),
        _ => {
            out.push('\\');
            out.push(marker);
            out.push_str(&hex);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Node {
        SourceParser::new().unwrap().parse("test.table", src).unwrap()
    }

    fn first_call(module: &Node) -> &Call {
        match module {
            Node::Module(stmts) => match &stmts[0] {
                Node::Call(c) => c,
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected module, got {:?}", other),
        }
    }

    #[test]
    fn test_lower_call_with_keywords() {
        let module = parse(r#"Column("gid", BIGINT, "Unique group ID", index=True, collate="nocase")"#);
        let call = first_call(&module);

        assert_eq!(call.callee(), Some("Column"));
        assert_eq!(call.args[0], Node::Str("gid".into()));
        assert_eq!(call.args[1], Node::Name("BIGINT".into()));
        assert_eq!(call.keywords.len(), 2);
        assert_eq!(call.keywords[0].arg, "index");
        assert_eq!(call.keywords[0].value, Node::NameConstant(NameConstant::True));
        assert_eq!(call.keywords[1].value, Node::Str("nocase".into()));
    }

    #[test]
    fn test_lower_strings() {
        let module = parse("description(\"Local \" 'system groups.\\n')\n# trailing comment\n");
        let call = first_call(&module);
        assert_eq!(call.args[0], Node::Str("Local system groups.\n".into()));

        assert_eq!(decode_string(r#"r"C:\temp""#), r"C:\temp");
        assert_eq!(decode_string(r#""""doc""""#), "doc");
        assert_eq!(decode_string(r#""\x41\u00e9\q""#), "Aé\\q");
    }

    #[test]
    fn test_lower_lambda_or_chain_is_flat() {
        let module = parse("extended_schema(lambda: WINDOWS() or LINUX() or DARWIN(), [])");
        let call = first_call(&module);
        let Node::Lambda(body) = &call.args[0] else {
            panic!("expected lambda, got {:?}", call.args[0]);
        };
        match body.as_ref() {
            Node::BoolOp { op, values } => {
                assert_eq!(*op, BoolOperator::Or);
                assert_eq!(values.len(), 3);
            }
            other => panic!("expected BoolOp, got {:?}", other),
        }
        assert_eq!(call.args[1], Node::List(vec![]));
    }

    #[test]
    fn test_lower_unsupported_shapes() {
        let module = parse("attributes(cacheable=1, owner=os.name)");
        let call = first_call(&module);
        assert_eq!(call.keywords[0].value, Node::Other("integer"));
        assert_eq!(call.keywords[1].value, Node::Other("attribute"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = SourceParser::new()
            .unwrap()
            .parse("broken.table", "schema([Column(\"a\", TEXT)\n")
            .unwrap_err();
        match err {
            Error::Syntax { path, .. } => assert_eq!(path, "broken.table"),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
