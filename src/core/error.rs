//! Typed error handling for the gateway
//!
//! Every failure that can stop a request before the GraphQL engine is reached
//! is expressed here, so dispatchers can turn it into a single structured
//! error envelope instead of a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: registry/configuration problems (deployment or schema mismatch)
//! - [`RequestError`]: malformed or unsupported inbound requests
//! - [`EncodingError`]: a parameter value that cannot become a GraphQL literal
//! - [`ReshapeError`]: an engine response that breaks the single-operation contract
//!
//! Each error carries two codes: the HTTP status written on the status line
//! ([`GatewayError::status_code`]) and the numeric code placed in the
//! envelope body ([`GatewayError::envelope_code`]). The two are allowed to
//! diverge.

use axum::http::StatusCode;
use std::fmt;

/// Envelope code for anything that failed to decode (JSON body, query, variables)
pub const ERR_DECODE_JSON: u16 = 422;

/// Envelope code for a parameter that is not acceptable for the request
pub const ERR_INVALID_PARAM: u16 = 400;

/// Envelope code for internal failures
pub const ERR_INTERNAL: u16 = 500;

/// The main error type for the gateway
#[derive(Debug)]
pub enum GatewayError {
    /// Registry/configuration errors
    Config(ConfigError),

    /// Inbound request errors
    Request(RequestError),

    /// Argument encoding errors
    Encoding(EncodingError),

    /// Response reshaping errors
    Reshape(ReshapeError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Config(e) => write!(f, "{}", e),
            GatewayError::Request(e) => write!(f, "{}", e),
            GatewayError::Encoding(e) => write!(f, "{}", e),
            GatewayError::Reshape(e) => write!(f, "{}", e),
            GatewayError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Config(e) => Some(e),
            GatewayError::Request(e) => Some(e),
            GatewayError::Encoding(e) => Some(e),
            GatewayError::Reshape(e) => Some(e),
            GatewayError::Internal(_) => None,
        }
    }
}

impl GatewayError {
    /// HTTP status line for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Config(_) => StatusCode::BAD_REQUEST,
            GatewayError::Request(e) => e.status_code(),
            GatewayError::Encoding(_) => StatusCode::BAD_REQUEST,
            GatewayError::Reshape(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric code carried inside the envelope body
    pub fn envelope_code(&self) -> u16 {
        match self {
            GatewayError::Config(_) => ERR_DECODE_JSON,
            GatewayError::Request(e) => e.envelope_code(),
            GatewayError::Encoding(_) => ERR_DECODE_JSON,
            GatewayError::Reshape(_) => ERR_INTERNAL,
            GatewayError::Internal(_) => ERR_INTERNAL,
        }
    }

    /// Symbolic error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Config(e) => e.error_code(),
            GatewayError::Request(e) => e.error_code(),
            GatewayError::Encoding(e) => e.error_code(),
            GatewayError::Reshape(_) => "RESHAPE_ERROR",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the error points at a deployment/schema mismatch rather than user input
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::Config(_))
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to the type registry and its configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse a configuration document
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A declared type string does not follow the `Name`, `[Name]`, `Name!` grammar
    InvalidTypeSyntax {
        declared: String,
    },

    /// A declared type does not resolve to a scalar, enum or input object
    UnresolvedType {
        owner: String,
        type_name: String,
    },

    /// An operation, argument, type or field name is not a GraphQL Name
    InvalidName {
        what: &'static str,
        name: String,
    },

    /// A selection fragment does not parse as a GraphQL selection set
    InvalidSelection {
        operation: String,
        message: String,
    },

    /// The same type name is registered as more than one kind
    ConflictingKind {
        type_name: String,
    },

    /// A route uses a method the dispatchers do not serve
    UnsupportedMethod {
        method: String,
        path: String,
    },

    /// No operation is registered for a route
    UnknownOperation {
        method: String,
        route: String,
    },

    /// No selection fragment is registered for an operation
    MissingSelection {
        operation: String,
    },

    /// IO error while reading configuration
    IoError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidTypeSyntax { declared } => {
                write!(f, "Invalid declared type '{}'", declared)
            }
            ConfigError::UnresolvedType { owner, type_name } => {
                write!(f, "Unresolved type '{}' referenced by {}", type_name, owner)
            }
            ConfigError::InvalidName { what, name } => {
                write!(f, "Invalid {} name '{}'", what, name)
            }
            ConfigError::InvalidSelection { operation, message } => {
                write!(
                    f,
                    "Invalid selection for operation '{}': {}",
                    operation, message
                )
            }
            ConfigError::ConflictingKind { type_name } => {
                write!(f, "Type '{}' is registered as more than one kind", type_name)
            }
            ConfigError::UnsupportedMethod { method, path } => {
                write!(f, "Unsupported method {} for route {}", method, path)
            }
            ConfigError::UnknownOperation { method, route } => {
                write!(f, "unknown operation: {} {}", method, route)
            }
            ConfigError::MissingSelection { operation } => {
                write!(f, "no selection registered for operation '{}'", operation)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownOperation { .. } => "UNKNOWN_OPERATION",
            ConfigError::MissingSelection { .. } => "MISSING_SELECTION",
            _ => "CONFIG_ERROR",
        }
    }
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        GatewayError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to inbound HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// A JSON document (body, variables, extensions) could not be decoded
    InvalidJson {
        what: &'static str,
        message: String,
    },

    /// The URL query string could not be decoded
    InvalidQueryString {
        message: String,
    },

    /// The request body could not be read
    InvalidBody {
        message: String,
    },

    /// The native GraphQL endpoint was called without a query
    MissingQuery,

    /// GET used against a mutation
    MutationOverGet {
        operation: String,
    },

    /// No transport accepted the request
    UnsupportedTransport {
        method: String,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidJson { what, message } => {
                write!(f, "{} could not be decoded: {}", what, message)
            }
            RequestError::InvalidQueryString { message } => {
                write!(f, "query string could not be decoded: {}", message)
            }
            RequestError::InvalidBody { message } => {
                write!(f, "request body could not be read: {}", message)
            }
            RequestError::MissingQuery => {
                write!(f, "missing GraphQL query")
            }
            RequestError::MutationOverGet { .. } => {
                write!(f, "GET requests only allow query operations")
            }
            RequestError::UnsupportedTransport { method } => {
                write!(f, "transport not supported for {} request", method)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidQueryString { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingQuery => StatusCode::BAD_REQUEST,
            RequestError::MutationOverGet { .. } => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::UnsupportedTransport { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn envelope_code(&self) -> u16 {
        match self {
            RequestError::InvalidJson { .. } => ERR_DECODE_JSON,
            RequestError::InvalidQueryString { .. } => ERR_DECODE_JSON,
            RequestError::InvalidBody { .. } => ERR_DECODE_JSON,
            RequestError::MissingQuery => ERR_INVALID_PARAM,
            RequestError::MutationOverGet { .. } => ERR_INVALID_PARAM,
            RequestError::UnsupportedTransport { .. } => ERR_INVALID_PARAM,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidJson { .. } => "INVALID_JSON",
            RequestError::InvalidQueryString { .. } => "INVALID_QUERY_STRING",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingQuery => "MISSING_QUERY",
            RequestError::MutationOverGet { .. } => "METHOD_NOT_ALLOWED",
            RequestError::UnsupportedTransport { .. } => "UNSUPPORTED_TRANSPORT",
        }
    }
}

impl From<RequestError> for GatewayError {
    fn from(err: RequestError) -> Self {
        GatewayError::Request(err)
    }
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors raised while turning a parameter value into a GraphQL literal
#[derive(Debug)]
pub enum EncodingError {
    /// The declared type resolves to nothing the registry knows
    UnknownArgumentType {
        argument: String,
        type_name: String,
    },

    /// The value shape does not fit the declared type (e.g. a mapping for a scalar)
    TypeMismatch {
        argument: String,
        expected: String,
        found: &'static str,
    },

    /// The textual form is not a single valid GraphQL token for the declared kind
    InvalidLiteral {
        argument: String,
        type_name: String,
        value: String,
    },

    /// A well-known custom scalar rejected the value
    InvalidScalar {
        argument: String,
        type_name: String,
        message: String,
    },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::UnknownArgumentType {
                argument,
                type_name,
            } => {
                write!(f, "unknown argument type '{}' for '{}'", type_name, argument)
            }
            EncodingError::TypeMismatch {
                argument,
                expected,
                found,
            } => {
                write!(
                    f,
                    "argument '{}' expects {} but got {}",
                    argument, expected, found
                )
            }
            EncodingError::InvalidLiteral {
                argument,
                type_name,
                value,
            } => {
                write!(
                    f,
                    "value '{}' of argument '{}' is not a valid {} literal",
                    value, argument, type_name
                )
            }
            EncodingError::InvalidScalar {
                argument,
                type_name,
                message,
            } => {
                write!(
                    f,
                    "argument '{}' is not a valid {}: {}",
                    argument, type_name, message
                )
            }
        }
    }
}

impl std::error::Error for EncodingError {}

impl EncodingError {
    pub fn error_code(&self) -> &'static str {
        match self {
            EncodingError::UnknownArgumentType { .. } => "UNKNOWN_ARGUMENT_TYPE",
            EncodingError::TypeMismatch { .. } => "ARGUMENT_TYPE_MISMATCH",
            EncodingError::InvalidLiteral { .. } => "INVALID_LITERAL",
            EncodingError::InvalidScalar { .. } => "INVALID_SCALAR",
        }
    }
}

impl From<EncodingError> for GatewayError {
    fn from(err: EncodingError) -> Self {
        GatewayError::Encoding(err)
    }
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Errors raised when the engine response breaks the one-operation-per-document contract
#[derive(Debug)]
pub enum ReshapeError {
    /// `data` carried more than one top-level key
    MultipleRootFields { count: usize },

    /// `data` was neither an object nor null
    DataNotObject,
}

impl fmt::Display for ReshapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshapeError::MultipleRootFields { count } => {
                write!(f, "expected a single root field in data, found {}", count)
            }
            ReshapeError::DataNotObject => write!(f, "expected data to be an object"),
        }
    }
}

impl std::error::Error for ReshapeError {}

impl From<ReshapeError> for GatewayError {
    fn from(err: ReshapeError) -> Self {
        GatewayError::Reshape(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

/// Convert from anyhow::Error for call sites that only carry a message
impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_diverges_status_and_code() {
        let err: GatewayError = RequestError::InvalidJson {
            what: "json body",
            message: "EOF".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.envelope_code(), ERR_DECODE_JSON);
        assert!(err.to_string().contains("json body could not be decoded"));
    }

    #[test]
    fn test_mutation_over_get_is_method_not_allowed() {
        let err: GatewayError = RequestError::MutationOverGet {
            operation: "createTodo".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.envelope_code(), ERR_INVALID_PARAM);
        assert_eq!(err.error_code(), "METHOD_NOT_ALLOWED");
    }

    #[test]
    fn test_config_error_flags_configuration() {
        let err: GatewayError = ConfigError::UnknownOperation {
            method: "GET".to_string(),
            route: "/nope".to_string(),
        }
        .into();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "unknown operation: GET /nope");
    }

    #[test]
    fn test_encoding_error_display() {
        let err = EncodingError::UnknownArgumentType {
            argument: "filter".to_string(),
            type_name: "Mystery".to_string(),
        };
        assert!(err.to_string().contains("unknown argument type"));
        assert_eq!(err.error_code(), "UNKNOWN_ARGUMENT_TYPE");
    }

    #[test]
    fn test_reshape_error_is_internal() {
        let err: GatewayError = ReshapeError::MultipleRootFields { count: 2 }.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.envelope_code(), ERR_INTERNAL);
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{").unwrap_err();
        let err: ConfigError = yaml_err.into();
        assert!(matches!(err, ConfigError::ParseError { file: None, .. }));
    }
}
