//! Literal values
//!
//! Spec files spell the same logical field several ways: `"linux"`,
//! `LINUX`, `True`. [`Literal`] keeps which spelling was used; [`Scalar`]
//! is what ends up in the exported model.

use crate::syntax::{NameConstant, Node};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A literal argument as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal<'a> {
    String(&'a str),
    Identifier(&'a str),
    Bool(bool),
    None,
}

impl<'a> Literal<'a> {
    /// Read a literal out of a node, if the node is one.
    pub fn from_node(node: &'a Node) -> Option<Self> {
        match node {
            Node::Str(s) => Some(Literal::String(s)),
            Node::Name(id) => Some(Literal::Identifier(id)),
            Node::NameConstant(NameConstant::True) => Some(Literal::Bool(true)),
            Node::NameConstant(NameConstant::False) => Some(Literal::Bool(false)),
            Node::NameConstant(NameConstant::None) => Some(Literal::None),
            _ => None,
        }
    }

    /// Coercion used for column options, table attributes and foreign keys.
    pub fn to_scalar(self) -> Scalar {
        match self {
            Literal::String(s) | Literal::Identifier(s) => Scalar::String(s.to_string()),
            Literal::Bool(b) => Scalar::Bool(b),
            Literal::None => Scalar::Null,
        }
    }

    /// Coercion used when the literal names a platform category.
    pub fn as_key(self) -> Cow<'a, str> {
        match self {
            Literal::String(s) | Literal::Identifier(s) => Cow::Borrowed(s),
            Literal::Bool(true) => Cow::Borrowed("True"),
            Literal::Bool(false) => Cow::Borrowed("False"),
            Literal::None => Cow::Borrowed("None"),
        }
    }
}

/// A free-form option value in the exported model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    String(String),
    Null,
}

impl Scalar {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Null => write!(f, "null"),
        }
    }
}
