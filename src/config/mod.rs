//! Configuration loading and management
//!
//! The registry tables (operations, input objects, enums, custom scalars and
//! REST routes) are produced once by build tooling from the GraphQL schema and
//! loaded here from YAML.

use crate::core::types::OperationKind;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Argument or input-field name -> declared type string (e.g. `"[ID!]"`)
pub type FieldTypes = IndexMap<String, String>;

/// A REST route bound to a GraphQL operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Route pattern in router syntax (e.g., "/todos/{id}")
    pub path: String,

    /// Name of the root field to call
    pub operation: String,
}

/// Configuration for one root operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Whether the field lives under `Query` or `Mutation`
    #[serde(default)]
    pub kind: OperationKind,

    /// Precomputed selection fragment (e.g., "{id,text,done}")
    #[serde(default)]
    pub selection: Option<String>,

    /// Argument name -> declared type
    #[serde(default)]
    pub arguments: FieldTypes,
}

/// The four registry tables plus selections, as loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Custom scalar names (built-in scalars are implicit)
    #[serde(default)]
    pub scalars: Vec<String>,

    /// Enum type names
    #[serde(default)]
    pub enums: Vec<String>,

    /// Input object name -> field types
    #[serde(default)]
    pub input_objects: IndexMap<String, FieldTypes>,

    /// Operation name -> operation configuration
    #[serde(default)]
    pub operations: IndexMap<String, OperationConfig>,

    /// REST routes
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RegistryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read registry config '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations into one
    ///
    /// Later configs win on operation and input-object name collisions and on
    /// routes with the same method and path. Scalar and enum lists are unioned.
    pub fn merge(configs: Vec<RegistryConfig>) -> Self {
        let mut merged = RegistryConfig::default();

        for config in configs {
            for scalar in config.scalars {
                if !merged.scalars.contains(&scalar) {
                    merged.scalars.push(scalar);
                }
            }
            for name in config.enums {
                if !merged.enums.contains(&name) {
                    merged.enums.push(name);
                }
            }
            merged.input_objects.extend(config.input_objects);
            merged.operations.extend(config.operations);

            for route in config.routes {
                match merged.routes.iter_mut().find(|r| {
                    r.method.eq_ignore_ascii_case(&route.method) && r.path == route.path
                }) {
                    Some(existing) => *existing = route,
                    None => merged.routes.push(route),
                }
            }
        }

        merged
    }

    /// A small todo-list configuration used in docs and tests
    pub fn default_config() -> Self {
        Self::from_yaml_str(DEFAULT_CONFIG).unwrap_or_default()
    }
}

const DEFAULT_CONFIG: &str = r#"
enums: [TodoState]
input_objects:
  CreateTodoInput:
    text: "String!"
    state: TodoState
  UpdateTodoInput:
    text: String
    done: Boolean
operations:
  todos:
    kind: query
    selection: "{id,text,done}"
    arguments:
      done: Boolean
      ids: "[ID!]"
  todo:
    kind: query
    selection: "{id,text,done}"
    arguments:
      id: "ID!"
  createTodo:
    kind: mutation
    selection: "{id,text,done}"
    arguments:
      input: "CreateTodoInput!"
  updateTodo:
    kind: mutation
    selection: "{id,text,done}"
    arguments:
      id: "ID!"
      input: "UpdateTodoInput!"
  deleteTodo:
    kind: mutation
    selection: ""
    arguments:
      id: "ID!"
routes:
  - { method: GET, path: /todos, operation: todos }
  - { method: GET, path: "/todos/{id}", operation: todo }
  - { method: POST, path: /todos, operation: createTodo }
  - { method: PUT, path: "/todos/{id}", operation: updateTodo }
  - { method: DELETE, path: "/todos/{id}", operation: deleteTodo }
"#;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Path of the native GraphQL endpoint
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            graphql_path: default_graphql_path(),
            body_limit: default_body_limit(),
        }
    }
}

/// Complete gateway configuration: server settings plus registry tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(flatten)]
    pub registry: RegistryConfig,
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read gateway config '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}
