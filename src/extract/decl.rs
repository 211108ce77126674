//! Declaration pre-pass
//!
//! Classifies every call reached by the walk into a closed set of
//! declaration kinds, so the extractor never inspects node shapes to decide
//! what a call means.

use crate::schema::{EXTENDED_SCHEMA, FOREIGN_KEY, SCHEMA};
use crate::syntax::{self, Call, Node};

/// A recognised top-level call form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Declaration<'a> {
    TableName(&'a Call),
    Description(&'a Call),
    Schema(&'a Call),
    Column(&'a Call),
    Attributes(&'a Call),
    Implementation(&'a Call),
    FuzzPaths(&'a Call),
    ExtendedSchema(&'a Call),
    Examples(&'a Call),
    ForeignKey(&'a Call),
    /// Call to a name outside the vocabulary
    Unknown { callee: &'a str },
    /// Call whose callee is not a bare name (`os.path(...)`)
    Unnamed,
}

impl<'a> Declaration<'a> {
    pub fn classify(call: &'a Call) -> Self {
        let Some(callee) = call.callee() else {
            return Declaration::Unnamed;
        };
        match callee {
            "table_name" => Declaration::TableName(call),
            "description" => Declaration::Description(call),
            SCHEMA => Declaration::Schema(call),
            "Column" => Declaration::Column(call),
            "attributes" => Declaration::Attributes(call),
            "implementation" => Declaration::Implementation(call),
            "fuzz_paths" => Declaration::FuzzPaths(call),
            EXTENDED_SCHEMA => Declaration::ExtendedSchema(call),
            "examples" => Declaration::Examples(call),
            FOREIGN_KEY => Declaration::ForeignKey(call),
            other => Declaration::Unknown { callee: other },
        }
    }

    /// Whether the walk continues into this call's arguments.
    pub fn descends(&self) -> bool {
        matches!(
            self,
            Declaration::TableName(_)
                | Declaration::Description(_)
                | Declaration::Schema(_)
                | Declaration::Implementation(_)
        )
    }

    pub fn name(&self) -> &'a str {
        match self {
            Declaration::TableName(_) => "table_name",
            Declaration::Description(_) => "description",
            Declaration::Schema(_) => SCHEMA,
            Declaration::Column(_) => "Column",
            Declaration::Attributes(_) => "attributes",
            Declaration::Implementation(_) => "implementation",
            Declaration::FuzzPaths(_) => "fuzz_paths",
            Declaration::ExtendedSchema(_) => EXTENDED_SCHEMA,
            Declaration::Examples(_) => "examples",
            Declaration::ForeignKey(_) => FOREIGN_KEY,
            Declaration::Unknown { callee } => *callee,
            Declaration::Unnamed => "<unnamed>",
        }
    }
}

/// Collect declarations from a module in file order.
pub fn declarations<'a>(module: &'a Node) -> Vec<Declaration<'a>> {
    let mut decls = Vec::new();
    syntax::walk(module, &mut |node: &'a Node| match node {
        Node::Call(call) => {
            let decl = Declaration::classify(call);
            let descend = decl.descends();
            decls.push(decl);
            descend
        }
        _ => true,
    });
    decls
}
