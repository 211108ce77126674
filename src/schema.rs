//! Schema model
//!
//! A schema is the ordered column list of a table, either the base
//! `schema([...])` or a platform-restricted `extended_schema(PLATFORM, [...])`.

use crate::column::Column;
use crate::platform;
use crate::syntax::{Call, Node};
use crate::value::{Literal, Scalar};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SCHEMA: &str = "schema";
pub const EXTENDED_SCHEMA: &str = "extended_schema";
pub const FOREIGN_KEY: &str = "ForeignKey";

/// Free-form `ForeignKey(column=..., table=...)` descriptor.
pub type ForeignKey = BTreeMap<String, Scalar>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Platforms this variant applies to; empty means everywhere
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub platforms: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub extended: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `schema([...])` or `extended_schema(PLATFORM, [...])` call.
    pub fn extract(call: &Call) -> Result<Self> {
        let mut schema = Schema::new();
        schema.extract_into(call)?;
        Ok(schema)
    }

    fn extract_into(&mut self, call: &Call) -> Result<()> {
        let callee = match call.func.as_ref() {
            Node::Name(id) => id.as_str(),
            other => return Err(Error::shape("schema callee", "name", other)),
        };

        let mut list_index = 0;
        if callee == EXTENDED_SCHEMA {
            self.extended = true;
            list_index = 1;
            let platform_arg = call
                .arg(0)
                .ok_or_else(|| Error::missing("extended_schema argument 0", "platform"))?;
            match platform_arg {
                Node::Lambda(body) => self.parse_lambda(body)?,
                other => self.merge_platforms(platform::resolve_platform_arg(other)?),
            }
        }

        let context = format!("{} argument {}", callee, list_index);
        let elements = match call.arg(list_index) {
            Some(Node::List(elements)) => elements,
            Some(other) => return Err(Error::shape(context, "list", other)),
            None => return Err(Error::missing(context, "list")),
        };

        for (idx, element) in elements.iter().enumerate() {
            let context = format!("{} column {}", callee, idx);
            let decl = match element {
                Node::Call(decl) => decl,
                other => return Err(Error::shape(context, "call", other)),
            };
            let name = match decl.func.as_ref() {
                Node::Name(id) => id.as_str(),
                other => return Err(Error::shape(context, "call to a bare name", other)),
            };

            if name == FOREIGN_KEY {
                self.foreign_keys.push(keyword_map(decl));
                continue;
            }

            if decl.args.is_empty() {
                tracing::warn!("Non Column() definition detected (function={}), skipping", name);
                continue;
            }

            let column = Column::from_call(decl, self.columns.len());
            self.columns.push(column);
        }

        tracing::debug!(
            "Extracted {} with {} columns, {} foreign keys",
            callee,
            self.columns.len(),
            self.foreign_keys.len()
        );
        Ok(())
    }

    /// Union `lambda: A() or B()` categories into the platform set.
    pub fn parse_lambda(&mut self, body: &Node) -> Result<()> {
        let platforms = platform::resolve_lambda(body)?;
        self.merge_platforms(platforms);
        Ok(())
    }

    /// Union platform identifiers into this schema's set.
    pub fn merge_platforms<I, S>(&mut self, platforms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms.extend(platforms.into_iter().map(Into::into));
    }

    /// Union every platform of a category.
    pub fn merge_category(&mut self, category: &str) -> Result<()> {
        self.merge_platforms(platform::category_platforms(category)?.iter().copied());
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when the schema applies to `platform` (an empty set applies everywhere).
    pub fn applies_to(&self, platform: &str) -> bool {
        self.platforms.is_empty() || self.platforms.contains(platform)
    }
}

fn keyword_map(call: &Call) -> ForeignKey {
    call.keywords
        .iter()
        .filter_map(|kw| Literal::from_node(&kw.value).map(|lit| (kw.arg.clone(), lit.to_scalar())))
        .collect()
}
