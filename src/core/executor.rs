//! Execution engine seam

use crate::core::document;
use crate::core::response::{Execution, GraphQLError, GraphQLRequest, GraphQLResponse};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// The GraphQL execution engine the gateway forwards documents to
///
/// Engine-level failures (validation, resolver errors) belong in the returned
/// response's `errors`. An `Err` means the engine could not be reached at all
/// and is reported to the client as an internal error.
#[async_trait]
pub trait GraphQLExecutor: Send + Sync {
    /// Execute one request
    async fn execute(&self, request: GraphQLRequest) -> Result<Execution>;

    /// Name used in logs
    fn name(&self) -> &str {
        "executor"
    }
}

/// In-memory executor answering with canned responses
///
/// A response is registered per root field name. The engine's usual wrapping
/// is reproduced: the canned value ends up under `data.<field>`. Every request
/// received is recorded. Useful for testing and development.
#[derive(Clone, Default)]
pub struct StaticExecutor {
    responses: Arc<RwLock<HashMap<String, Canned>>>,
    received: Arc<RwLock<Vec<GraphQLRequest>>>,
}

#[derive(Clone)]
enum Canned {
    Data { value: Value, total: Option<i64> },
    Errors(Vec<GraphQLError>),
}

impl StaticExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `field` with `value`
    pub fn with_data(self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field.into(), Canned::Data { value, total: None })
    }

    /// Answer `field` with `value` and a total count
    pub fn with_paged_data(self, field: impl Into<String>, value: Value, total: i64) -> Self {
        self.insert(
            field.into(),
            Canned::Data {
                value,
                total: Some(total),
            },
        )
    }

    /// Answer `field` with errors and no data
    pub fn with_errors(self, field: impl Into<String>, errors: Vec<GraphQLError>) -> Self {
        self.insert(field.into(), Canned::Errors(errors))
    }

    fn insert(self, field: String, canned: Canned) -> Self {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(field, canned);
        }
        self
    }

    /// Requests received so far, in arrival order
    pub fn received(&self) -> Vec<GraphQLRequest> {
        self.received
            .read()
            .map(|received| received.clone())
            .unwrap_or_default()
    }

    /// Query text of the last request received
    pub fn last_query(&self) -> Option<String> {
        self.received().last().map(|r| r.query.clone())
    }
}

#[async_trait]
impl GraphQLExecutor for StaticExecutor {
    async fn execute(&self, request: GraphQLRequest) -> Result<Execution> {
        self.received
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .push(request.clone());

        let info = match document::inspect(&request.query, request.operation_name.as_deref()) {
            Ok(info) => info,
            Err(e) => {
                let error = GraphQLError::new(e.to_string()).with_code("GRAPHQL_PARSE_FAILED");
                return Ok(GraphQLResponse::from_errors(vec![error]).into());
            }
        };

        let responses = self
            .responses
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut data = Map::new();
        let mut errors = Vec::new();
        let mut total = None;

        for field in info.root_fields {
            match responses.get(&field) {
                Some(Canned::Data { value, total: t }) => {
                    data.insert(field, value.clone());
                    total = total.or(*t);
                }
                Some(Canned::Errors(errs)) => {
                    data.insert(field, Value::Null);
                    errors.extend(errs.iter().cloned());
                }
                None => errors.push(
                    GraphQLError::new(format!("Cannot query field \"{}\"", field))
                        .with_code("GRAPHQL_VALIDATION_FAILED"),
                ),
            }
        }

        let data = if data.is_empty() {
            Value::Null
        } else {
            Value::Object(data)
        };

        Ok(Execution {
            response: GraphQLResponse {
                data,
                errors,
                extensions: None,
            },
            total,
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_canned_data_is_wrapped_by_field() {
        let executor = StaticExecutor::new().with_data("todos", json!([{"id": "T1"}]));

        let execution = executor
            .execute(GraphQLRequest::new("query { todos{id} }"))
            .await
            .unwrap();

        assert_eq!(
            execution.response.data,
            json!({"todos": [{"id": "T1"}]})
        );
        assert!(execution.response.errors.is_empty());
        assert_eq!(executor.last_query().as_deref(), Some("query { todos{id} }"));
    }

    #[tokio::test]
    async fn test_total_is_reported() {
        let executor = StaticExecutor::new().with_paged_data("todos", json!([]), 7);
        let execution = executor
            .execute(GraphQLRequest::new("{ todos { id } }"))
            .await
            .unwrap();
        assert_eq!(execution.total, Some(7));
    }

    #[tokio::test]
    async fn test_unknown_field_is_validation_error() {
        let executor = StaticExecutor::new();
        let execution = executor
            .execute(GraphQLRequest::new("{ nope }"))
            .await
            .unwrap();
        assert_eq!(execution.response.data, Value::Null);
        assert_eq!(
            execution.response.errors[0].extensions["code"],
            json!("GRAPHQL_VALIDATION_FAILED")
        );
    }

    #[tokio::test]
    async fn test_parse_failure_is_reported() {
        let executor = StaticExecutor::new();
        let execution = executor
            .execute(GraphQLRequest::new("query {"))
            .await
            .unwrap();
        assert_eq!(
            execution.response.errors[0].extensions["code"],
            json!("GRAPHQL_PARSE_FAILED")
        );
        assert_eq!(executor.received().len(), 1);
    }

    #[tokio::test]
    async fn test_canned_errors() {
        let executor = StaticExecutor::new().with_errors(
            "todo",
            vec![GraphQLError::new("not found").with_code("404")],
        );
        let execution = executor
            .execute(GraphQLRequest::new(r#"query { todo(id:"x"){id} }"#))
            .await
            .unwrap();
        assert_eq!(execution.response.data, json!({"todo": null}));
        assert_eq!(execution.response.errors.len(), 1);
    }

    #[test]
    fn test_clones_share_received_requests() {
        let executor = StaticExecutor::new().with_data("todos", json!([]));
        let observer = executor.clone();

        tokio_test::block_on(executor.execute(GraphQLRequest::new("{ todos { id } }"))).unwrap();

        assert_eq!(observer.received().len(), 1);
        assert_eq!(observer.name(), "static");
    }
}
