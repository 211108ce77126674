//! Syntax layer
//!
//! `.table` files are Python call syntax. Tree-sitter parses them; [`lower`]
//! turns the concrete tree into the closed [`Node`] set below, which is all
//! the extractor ever looks at.

pub mod lower;

pub use lower::SourceParser;

/// Generic syntax node for the restricted spec grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Module(Vec<Node>),
    Call(Call),
    Name(String),
    Str(String),
    NameConstant(NameConstant),
    List(Vec<Node>),
    Lambda(Box<Node>),
    BoolOp { op: BoolOperator, values: Vec<Node> },
    /// Any construct outside the grammar, by tree-sitter kind.
    Other(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub func: Box<Node>,
    pub args: Vec<Node>,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: String,
    pub value: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameConstant {
    True,
    False,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

impl Node {
    /// Short shape name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Node::Module(_) => "module",
            Node::Call(_) => "call",
            Node::Name(_) => "name",
            Node::Str(_) => "string",
            Node::NameConstant(_) => "constant",
            Node::List(_) => "list",
            Node::Lambda(_) => "lambda",
            Node::BoolOp { op: BoolOperator::And, .. } => "boolean AND",
            Node::BoolOp { op: BoolOperator::Or, .. } => "boolean OR",
            Node::Other(kind) => *kind,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Node::Name(id) => Some(id),
            _ => None,
        }
    }
}

impl Call {
    /// Callee identifier, when the callee is a bare name.
    pub fn callee(&self) -> Option<&str> {
        self.func.as_name()
    }

    pub fn arg(&self, index: usize) -> Option<&Node> {
        self.args.get(index)
    }
}

/// Depth-first walk in source order.
///
/// `visit` runs once per node; returning `false` skips that node's children.
pub fn walk<'a, F>(node: &'a Node, visit: &mut F)
where
    F: FnMut(&'a Node) -> bool,
{
    if !visit(node) {
        return;
    }
    match node {
        Node::Module(children) | Node::List(children) => {
            for child in children {
                walk(child, visit);
            }
        }
        Node::Call(call) => {
            walk(&call.func, visit);
            for arg in &call.args {
                walk(arg, visit);
            }
            for kw in &call.keywords {
                walk(&kw.value, visit);
            }
        }
        Node::Lambda(body) => walk(body, visit),
        Node::BoolOp { values, .. } => {
            for value in values {
                walk(value, visit);
            }
        }
        Node::Name(_) | Node::Str(_) | Node::NameConstant(_) | Node::Other(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Node>) -> Node {
        Node::Call(Call {
            func: Box::new(Node::Name(name.to_string())),
            args,
            keywords: vec![],
        })
    }

    #[test]
    fn test_walk_prunes_children() {
        let module = Node::Module(vec![
            call("schema", vec![Node::List(vec![call("Column", vec![])])]),
            call("attributes", vec![call("hidden", vec![])]),
        ]);

        let mut seen = Vec::new();
        walk(&module, &mut |node| {
            if let Node::Call(c) = node {
                let name = c.callee().unwrap_or_default().to_string();
                let descend = name != "attributes";
                seen.push(name);
                return descend;
            }
            true
        });

        assert_eq!(seen, vec!["schema", "Column", "attributes"]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(Node::Str("x".into()).describe(), "string");
        assert_eq!(Node::Other("integer").describe(), "integer");
        let op = Node::BoolOp { op: BoolOperator::And, values: vec![] };
        assert_eq!(op.describe(), "boolean AND");
    }
}
