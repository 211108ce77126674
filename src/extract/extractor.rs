//! Table extractor
//!
//! Applies declarations to a [`Table`] in file order. Every handler is
//! independent of the others; only a second base `schema(...)` is rejected.

use super::decl::Declaration;
use crate::schema::Schema;
use crate::syntax::{Call, Node};
use crate::table::Table;
use crate::value::Literal;
use crate::{Error, Result};

pub struct TableExtractor {
    table: Table,
}

impl TableExtractor {
    /// Start from the provisional name (the file stem).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: Table::new(name),
        }
    }

    pub fn finish(self) -> Table {
        self.table
    }

    /// Apply one declaration.
    pub fn apply(&mut self, decl: &Declaration<'_>) -> Result<()> {
        let result = match *decl {
            Declaration::TableName(call) => self.extract_names(call),
            Declaration::Description(call) => string_arg(call, "description")
                .map(|desc| self.table.description = desc.to_string()),
            Declaration::Schema(call) => self.extract_schema(call),
            Declaration::Attributes(call) => {
                self.extract_attributes(call);
                Ok(())
            }
            Declaration::Implementation(call) => string_arg(call, "implementation")
                .map(|imp| self.table.implementation = imp.to_string()),
            Declaration::FuzzPaths(call) => string_list_arg(call, "fuzz_paths")
                .map(|paths| self.table.fuzz_paths.extend(paths)),
            Declaration::ExtendedSchema(call) => self.extract_extended_schema(call),
            Declaration::Examples(call) => string_list_arg(call, "examples")
                .map(|examples| self.table.examples.extend(examples)),
            Declaration::Column(_) | Declaration::ForeignKey(_) => return Ok(()),
            Declaration::Unknown { callee } => {
                tracing::warn!(table = %self.table.name, function = callee, "Unhandled call, skipping");
                return Ok(());
            }
            Declaration::Unnamed => {
                tracing::warn!(table = %self.table.name, "Call without a bare-name callee, skipping");
                return Ok(());
            }
        };

        match &result {
            Ok(()) => tracing::debug!(table = %self.table.name, "Extracted {}", decl.name()),
            Err(e) => tracing::error!(table = %self.table.name, error = %e, "Spec parsing error"),
        }
        result
    }

    /// `table_name("name", aliases=["a", "b"])`
    fn extract_names(&mut self, call: &Call) -> Result<()> {
        self.table.name = string_arg(call, "table_name")?.to_string();

        for kw in &call.keywords {
            if kw.arg != "aliases" {
                tracing::warn!(table = %self.table.name, keyword = %kw.arg, "Unhandled table_name keyword");
                continue;
            }
            let Node::List(elements) = &kw.value else {
                tracing::warn!(table = %self.table.name, "aliases keyword is not a list");
                continue;
            };
            for (idx, element) in elements.iter().enumerate() {
                match element.as_str() {
                    Some(alias) => self.table.aliases.push(alias.to_string()),
                    None => tracing::warn!(
                        table = %self.table.name,
                        "aliases element {} is {}, not a string",
                        idx,
                        element.describe()
                    ),
                }
            }
        }
        Ok(())
    }

    fn extract_schema(&mut self, call: &Call) -> Result<()> {
        if self.table.schema.is_some() {
            return Err(Error::DuplicateSchema {
                table: self.table.name.clone(),
            });
        }
        self.table.schema = Some(Schema::extract(call)?);
        Ok(())
    }

    /// Register the schema under every platform it resolved to.
    fn extract_extended_schema(&mut self, call: &Call) -> Result<()> {
        let schema = Schema::extract(call)?;
        for platform in &schema.platforms {
            tracing::debug!(table = %self.table.name, "Extracted extended_schema for {}", platform);
            self.table.extended_schemas.insert(platform.clone(), schema.clone());
        }
        Ok(())
    }

    /// `attributes(...)` keywords; best-effort.
    fn extract_attributes(&mut self, call: &Call) {
        for kw in &call.keywords {
            if let Some(lit) = Literal::from_node(&kw.value) {
                self.table.attributes.insert(kw.arg.clone(), lit.to_scalar());
            }
        }
    }
}

fn string_arg<'a>(call: &'a Call, function: &str) -> Result<&'a str> {
    let context = format!("{} argument 0", function);
    match call.arg(0) {
        Some(Node::Str(s)) => Ok(s.as_str()),
        Some(other) => Err(Error::shape(context, "string", other)),
        None => Err(Error::missing(context, "string")),
    }
}

fn string_list_arg(call: &Call, function: &str) -> Result<Vec<String>> {
    let context = format!("{} argument 0", function);
    let elements = match call.arg(0) {
        Some(Node::List(elements)) => elements,
        Some(other) => return Err(Error::shape(context, "list", other)),
        None => return Err(Error::missing(context, "list")),
    };

    elements
        .iter()
        .enumerate()
        .map(|(idx, element)| match element {
            Node::Str(s) => Ok(s.clone()),
            other => Err(Error::shape(
                format!("{} list element {}", function, idx),
                "string",
                other,
            )),
        })
        .collect()
}
