//! Declared GraphQL type strings and type kinds
//!
//! A declared type is `Name`, optionally wrapped once in `[...]`, optionally
//! suffixed with `!` at either level. Non-null markers carry no meaning for
//! literal encoding and are dropped at parse time.

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Scalars every GraphQL schema provides
pub const BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Int", "Float", "ID", "String"];

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("valid name regex"));

/// True if `s` is a GraphQL Name token
pub fn is_graphql_name(s: &str) -> bool {
    NAME.is_match(s)
}

/// A parsed argument or input-field type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// A bare type name (`String`, `TodoState`, `CreateTodoInput`)
    Named(String),
    /// A one-level list of a named type (`[ID]`)
    List(String),
}

impl DeclaredType {
    /// Parse a declared type string such as `"[ID!]!"`
    pub fn parse(declared: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidTypeSyntax {
            declared: declared.to_string(),
        };

        let outer = strip_non_null(declared.trim());
        let parsed = match outer.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => DeclaredType::List(strip_non_null(inner.trim()).to_string()),
            None => DeclaredType::Named(outer.to_string()),
        };

        if is_graphql_name(parsed.base_name()) {
            Ok(parsed)
        } else {
            Err(invalid())
        }
    }

    /// The named type at the bottom of any list wrapping
    pub fn base_name(&self) -> &str {
        match self {
            DeclaredType::Named(name) | DeclaredType::List(name) => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DeclaredType::List(_))
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => write!(f, "{}", name),
            DeclaredType::List(name) => write!(f, "[{}]", name),
        }
    }
}

fn strip_non_null(s: &str) -> &str {
    s.trim_end_matches('!').trim_end()
}

/// What a named type is, as far as literal encoding cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Enum,
    InputObject,
}

/// Root type an operation lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
}

impl OperationKind {
    /// Keyword that opens a document for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }

    /// Keyword a synthesized document uses for an HTTP method: `query` for GET, `mutation` otherwise
    pub fn for_method(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") {
            OperationKind::Query
        } else {
            OperationKind::Mutation
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
