//! Parameter values gathered from query strings, path variables and JSON bodies
//!
//! Values are decoded once into [`ParamValue`] and then pattern-matched by the
//! encoder, so a sequence where an object was expected is an explicit branch
//! rather than a failed runtime cast.

use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::borrow::Cow;

/// Argument name -> value, in insertion order
pub type ParameterBag = IndexMap<String, ParamValue>;

/// A leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Default textual form (`42`, `true`, `abc`, `null`)
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Null => Cow::Borrowed("null"),
            Scalar::Bool(b) => Cow::Owned(b.to_string()),
            Scalar::Number(n) => Cow::Owned(n.to_string()),
            Scalar::String(s) => Cow::Borrowed(s),
        }
    }
}

/// A decoded parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    Sequence(Vec<ParamValue>),
    Object(ParameterBag),
}

impl ParamValue {
    /// A string scalar, as produced by query-string and path parsing
    pub fn string(s: impl Into<String>) -> Self {
        ParamValue::Scalar(Scalar::String(s.into()))
    }

    /// Short name of the variant, for error messages
    pub fn shape(&self) -> &'static str {
        match self {
            ParamValue::Scalar(Scalar::Null) => "null",
            ParamValue::Scalar(_) => "a scalar",
            ParamValue::Sequence(_) => "a list",
            ParamValue::Object(_) => "an object",
        }
    }

    pub fn as_object(&self) -> Option<&ParameterBag> {
        match self {
            ParamValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Scalar(Scalar::Null),
            Value::Bool(b) => ParamValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => ParamValue::Scalar(Scalar::Number(n)),
            Value::String(s) => ParamValue::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                ParamValue::Sequence(items.into_iter().map(ParamValue::from).collect())
            }
            Value::Object(map) => ParamValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}
