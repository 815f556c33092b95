//! Response reshaping
//!
//! Native GraphQL responses pass through as they are. REST responses lose the
//! operation-name wrapper around `data`, and engine errors collapse into one
//! envelope code, one `; `-joined message and an HTTP status.

use crate::core::error::{ERR_DECODE_JSON, ERR_INTERNAL, GatewayError, ReshapeError};
use crate::core::response::{Execution, GraphQLEnvelope, GraphQLError, GraphQLResponse, RestEnvelope};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Envelope code of a successful REST response
pub const CODE_OK: i64 = 200;

const VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
const PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";

/// A body for one of the two client populations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Rest(RestEnvelope),
    GraphQL(GraphQLEnvelope),
}

/// A reshaped response: status line plus body
#[derive(Debug, Clone, PartialEq)]
pub struct Reshaped {
    pub status: StatusCode,
    pub envelope: Envelope,
}

/// Code, codestr and message distilled from an error list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub code: i64,
    pub codestr: Option<String>,
    pub message: String,
}

/// Reshape an engine execution for REST or native clients
pub fn reshape(execution: Execution, rest: bool) -> Result<Reshaped, ReshapeError> {
    let Execution { response, total } = execution;

    if !rest {
        return Ok(Reshaped {
            status: StatusCode::OK,
            envelope: Envelope::GraphQL(GraphQLEnvelope { response, total }),
        });
    }

    let GraphQLResponse { data, errors, .. } = response;
    let data = unwrap_data(data)?;

    let envelope = match summarize_errors(&errors) {
        None => RestEnvelope {
            code: CODE_OK,
            codestr: None,
            message: None,
            data,
            total,
        },
        Some(summary) => RestEnvelope {
            code: summary.code,
            codestr: summary.codestr,
            message: Some(summary.message),
            data,
            total,
        },
    };

    Ok(Reshaped {
        status: status_for(envelope.code),
        envelope: Envelope::Rest(envelope),
    })
}

/// Shape a failure raised before or around the engine call
///
/// REST clients get a single-error envelope; native clients get a GraphQL
/// response carrying one error with the code in its extensions.
pub fn reshape_error(err: &GatewayError, rest: bool) -> Reshaped {
    let code = i64::from(err.envelope_code());
    let envelope = if rest {
        Envelope::Rest(RestEnvelope {
            code,
            codestr: Some(err.error_code().to_string()),
            message: Some(err.to_string()),
            data: Value::Null,
            total: None,
        })
    } else {
        let error = GraphQLError::new(err.to_string())
            .with_code(code.to_string())
            .with_codestr(err.error_code());
        Envelope::GraphQL(GraphQLEnvelope {
            response: GraphQLResponse::from_errors(vec![error]),
            total: None,
        })
    };

    Reshaped {
        status: err.status_code(),
        envelope,
    }
}

/// Remove the single operation-name key around `data`
fn unwrap_data(data: Value) -> Result<Value, ReshapeError> {
    match data {
        Value::Null => Ok(Value::Null),
        Value::Object(map) => {
            if map.len() > 1 {
                return Err(ReshapeError::MultipleRootFields { count: map.len() });
            }
            Ok(map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null))
        }
        _ => Err(ReshapeError::DataNotObject),
    }
}

/// Summarize an error list, `None` when it is empty
///
/// The first error with an integer `extensions.code` decides the code.
/// Without one, the first string code decides: validation and parse failures
/// map to 422, anything else to 500. No code at all means 422.
pub fn summarize_errors(errors: &[GraphQLError]) -> Option<ErrorSummary> {
    if errors.is_empty() {
        return None;
    }

    let codes = || errors.iter().filter_map(|e| e.extensions.get("code"));
    let code = codes()
        .find_map(integer_code)
        .or_else(|| {
            codes().find_map(Value::as_str).map(|s| match s {
                VALIDATION_FAILED | PARSE_FAILED => i64::from(ERR_DECODE_JSON),
                _ => i64::from(ERR_INTERNAL),
            })
        })
        .unwrap_or(i64::from(ERR_DECODE_JSON));

    let codestr = errors
        .iter()
        .find_map(|e| e.extensions.get("codestr").and_then(Value::as_str))
        .map(str::to_string);

    let message = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    Some(ErrorSummary {
        code,
        codestr,
        message,
    })
}

fn integer_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

/// HTTP status line for an envelope code
pub fn status_for(code: i64) -> StatusCode {
    if code == i64::from(ERR_DECODE_JSON) {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if code >= i64::from(ERR_INTERNAL) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}
