//! Wire shapes exchanged with the engine and with clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// When reading of the request started and finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadTime {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReadTime {
    /// A read window that starts and ends now
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            start: now,
            end: now,
        }
    }
}

/// A GraphQL request, as sent by native clients and handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    #[serde(default)]
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,

    /// Request read timing, for engines that trace it
    #[serde(skip)]
    pub read_time: Option<ReadTime>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// One element of an error path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// An error reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set `extensions.code`
    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.extensions.insert("code".to_string(), code.into());
        self
    }

    /// Set `extensions.codestr`
    pub fn with_codestr(mut self, codestr: impl Into<String>) -> Self {
        self.extensions
            .insert("codestr".to_string(), Value::String(codestr.into()));
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// The path in `a.b[0].c` form, empty when there is none
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
            }
        }
        out
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.message, self.path_string())
        }
    }
}

/// What the engine returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphQLResponse {
    pub fn from_data(data: Value) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }
}

/// Engine output plus the optional total count for paginated lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub response: GraphQLResponse,
    pub total: Option<i64>,
}

impl Execution {
    pub fn new(response: GraphQLResponse) -> Self {
        Self {
            response,
            total: None,
        }
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }
}

impl From<GraphQLResponse> for Execution {
    fn from(response: GraphQLResponse) -> Self {
        Execution::new(response)
    }
}

/// The flat body REST clients receive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestEnvelope {
    pub code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codestr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

/// The passthrough body native GraphQL clients receive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLEnvelope {
    #[serde(flatten)]
    pub response: GraphQLResponse,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}
