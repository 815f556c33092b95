//! Immutable type registry built once from configuration
//!
//! Holds the tables the request path needs: operation arguments, input-object
//! fields, type kinds and route bindings. Built before the first request is
//! served and only read afterwards, so it is shared as `Arc<TypeRegistry>`
//! without any locking.

use crate::config::{FieldTypes, RegistryConfig, RouteConfig};
use crate::core::error::ConfigError;
use crate::core::types::{BUILTIN_SCALARS, DeclaredType, OperationKind, TypeKind, is_graphql_name};
use indexmap::IndexMap;
use std::collections::HashMap;

/// HTTP methods the dispatchers serve
pub const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Name -> parsed declared type, in declaration order
pub type TypedFields = IndexMap<String, DeclaredType>;

/// Everything the registry knows about one root operation
#[derive(Debug, Clone)]
pub struct OperationEntry {
    pub kind: OperationKind,
    pub selection: Option<String>,
    pub arguments: TypedFields,
}

/// The registry itself
#[derive(Debug, Default)]
pub struct TypeRegistry {
    operations: IndexMap<String, OperationEntry>,
    input_objects: HashMap<String, TypedFields>,
    kinds: HashMap<String, TypeKind>,
    /// Maps (METHOD, route pattern) -> operation name
    routes: HashMap<(String, String), String>,
    route_list: Vec<RouteConfig>,
}

impl TypeRegistry {
    /// Build and validate a registry from configuration
    ///
    /// Names that are not GraphQL Names, selections that do not parse,
    /// unresolvable types, conflicting kinds, unknown route operations and
    /// unsupported route methods are all rejected here rather than at request time.
    pub fn from_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        let mut registry = TypeRegistry::default();

        for name in BUILTIN_SCALARS {
            registry.kinds.insert(name.to_string(), TypeKind::Scalar);
        }
        for name in &config.scalars {
            registry.register_kind(name, TypeKind::Scalar)?;
        }
        for name in &config.enums {
            registry.register_kind(name, TypeKind::Enum)?;
        }
        for name in config.input_objects.keys() {
            registry.register_kind(name, TypeKind::InputObject)?;
        }

        for (name, fields) in &config.input_objects {
            let fields = parse_fields("input field", fields)?;
            registry.input_objects.insert(name.clone(), fields);
        }

        for (name, operation) in config.operations {
            check_name("operation", &name)?;
            match &operation.selection {
                Some(selection) => check_selection(&name, selection)?,
                None => tracing::warn!(operation = %name, "operation has no selection fragment"),
            }
            let arguments = parse_fields("argument", &operation.arguments)?;
            registry.operations.insert(
                name,
                OperationEntry {
                    kind: operation.kind,
                    selection: operation.selection,
                    arguments,
                },
            );
        }

        registry.check_resolution()?;

        for route in config.routes {
            let method = route.method.to_ascii_uppercase();
            if !SUPPORTED_METHODS.contains(&method.as_str()) {
                return Err(ConfigError::UnsupportedMethod {
                    method: route.method,
                    path: route.path,
                });
            }
            if !registry.operations.contains_key(&route.operation) {
                return Err(ConfigError::UnknownOperation {
                    method,
                    route: route.path,
                });
            }

            let key = (method.clone(), route.path.clone());
            if registry.routes.insert(key, route.operation.clone()).is_some() {
                tracing::warn!(method = %method, path = %route.path, "duplicate route, last one wins");
                registry
                    .route_list
                    .retain(|r| !(r.method == method && r.path == route.path));
            }
            registry.route_list.push(RouteConfig { method, ..route });
        }

        tracing::debug!(
            operations = registry.operations.len(),
            input_objects = registry.input_objects.len(),
            routes = registry.route_list.len(),
            "type registry built"
        );

        Ok(registry)
    }

    fn register_kind(&mut self, name: &str, kind: TypeKind) -> Result<(), ConfigError> {
        let what = match kind {
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
            TypeKind::InputObject => "input object",
        };
        check_name(what, name)?;
        match self.kinds.insert(name.to_string(), kind) {
            Some(previous) if previous != kind => Err(ConfigError::ConflictingKind {
                type_name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_resolution(&self) -> Result<(), ConfigError> {
        let input_fields = self.input_objects.iter().flat_map(|(owner, fields)| {
            fields
                .iter()
                .map(move |(field, ty)| (format!("{}.{}", owner, field), ty))
        });
        let arguments = self.operations.iter().flat_map(|(owner, op)| {
            op.arguments
                .iter()
                .map(move |(arg, ty)| (format!("{}({})", owner, arg), ty))
        });

        for (owner, ty) in input_fields.chain(arguments) {
            if !self.kinds.contains_key(ty.base_name()) {
                return Err(ConfigError::UnresolvedType {
                    owner,
                    type_name: ty.base_name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Declared type of one operation argument
    pub fn lookup(&self, operation: &str, argument: &str) -> Option<&DeclaredType> {
        self.operations.get(operation)?.arguments.get(argument)
    }

    /// Field map of an input object
    pub fn lookup_input_fields(&self, type_name: &str) -> Option<&TypedFields> {
        self.input_objects.get(type_name)
    }

    /// Kind of a named type
    pub fn lookup_kind(&self, type_name: &str) -> Option<TypeKind> {
        self.kinds.get(type_name).copied()
    }

    /// Operation bound to a route
    pub fn operation_for_route(&self, method: &str, pattern: &str) -> Option<&str> {
        self.routes
            .get(&(method.to_ascii_uppercase(), pattern.to_string()))
            .map(|s| s.as_str())
    }

    pub fn operation(&self, operation: &str) -> Option<&OperationEntry> {
        self.operations.get(operation)
    }

    /// All argument types of an operation
    pub fn arguments(&self, operation: &str) -> Option<&TypedFields> {
        self.operations.get(operation).map(|op| &op.arguments)
    }

    pub fn selection(&self, operation: &str) -> Option<&str> {
        self.operations.get(operation)?.selection.as_deref()
    }

    pub fn operation_kind(&self, operation: &str) -> Option<OperationKind> {
        self.operations.get(operation).map(|op| op.kind)
    }

    /// Registered routes, methods upper-cased, in configuration order
    pub fn routes(&self) -> &[RouteConfig] {
        &self.route_list
    }
}

fn parse_fields(what: &'static str, fields: &FieldTypes) -> Result<TypedFields, ConfigError> {
    fields
        .iter()
        .map(|(name, declared)| {
            check_name(what, name)?;
            Ok((name.clone(), DeclaredType::parse(declared)?))
        })
        .collect()
}

fn check_name(what: &'static str, name: &str) -> Result<(), ConfigError> {
    if is_graphql_name(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            what,
            name: name.to_string(),
        })
    }
}

/// The selection must be empty or a braced set, and must complete
/// `query { <operation><selection> }` into a document holding exactly one operation
fn check_selection(operation: &str, selection: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidSelection {
        operation: operation.to_string(),
        message,
    };

    let trimmed = selection.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return Err(invalid("selection must start with '{'".to_string()));
    }

    let text = format!("query {{ {}{} }}", operation, selection);

    let document = graphql_parser::parse_query::<String>(&text).map_err(|e| invalid(e.to_string()))?;
    if document.definitions.len() != 1 {
        return Err(invalid(format!(
            "expected one operation, found {}",
            document.definitions.len()
        )));
    }
    Ok(())
}
