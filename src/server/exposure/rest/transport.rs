//! Transport trait, transport chain and the shared request pipeline
//!
//! Every request moves through the same stages:
//! `Received -> ParamsMerged -> QuerySynthesized -> Executed -> Reshaped -> Written`.
//! Failures do not leave the machine early: they become a reshaped error
//! envelope and are written like any other response.

use super::inbound::InboundRequest;
use crate::core::document;
use crate::core::error::{ConfigError, GatewayError, GatewayResult, RequestError};
use crate::core::merger::{ParameterMerger, decode_body};
use crate::core::reshaper::{Reshaped, reshape, reshape_error};
use crate::core::response::{GraphQLRequest, ReadTime};
use crate::core::synthesizer::QuerySynthesizer;
use crate::core::types::OperationKind;
use crate::server::host::GatewayHost;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;

/// Request processing stages, for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    ParamsMerged,
    QuerySynthesized,
    Executed,
    Reshaped,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::ParamsMerged => "params_merged",
            Stage::QuerySynthesized => "query_synthesized",
            Stage::Executed => "executed",
            Stage::Reshaped => "reshaped",
            Stage::Written => "written",
        };
        f.write_str(name)
    }
}

pub(crate) fn trace_stage(stage: Stage, request: &InboundRequest) {
    tracing::trace!(
        stage = %stage,
        method = %request.method,
        route = %request.route_pattern,
        "request stage"
    );
}

/// A way of turning an HTTP request into an engine call
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether this transport claims the request
    fn supports(&self, request: &InboundRequest) -> bool;

    /// Process the request to a reshaped response
    async fn dispatch(&self, host: &GatewayHost, request: &InboundRequest) -> Reshaped;
}

/// Ordered list of transports; the first one that supports a request wins
#[derive(Default)]
pub struct TransportChain {
    transports: Vec<Box<dyn Transport>>,
}

impl TransportChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET, then POST/PUT/PATCH, then DELETE
    pub fn standard() -> Self {
        Self::new()
            .with_transport(super::get::GetTransport)
            .with_transport(super::post::PostTransport)
            .with_transport(super::delete::DeleteTransport)
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transports.push(Box::new(transport));
        self
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Hand the request to the first transport that supports it
    ///
    /// With no taker the client gets a 400 "transport not supported" envelope.
    pub async fn dispatch(&self, host: &GatewayHost, request: &InboundRequest) -> Reshaped {
        trace_stage(Stage::Received, request);

        match self.transports.iter().find(|t| t.supports(request)) {
            Some(transport) => {
                tracing::debug!(
                    transport = transport.name(),
                    method = %request.method,
                    route = %request.route_pattern,
                    "dispatching request"
                );
                transport.dispatch(host, request).await
            }
            None => {
                let err = RequestError::UnsupportedTransport {
                    method: request.method.to_string(),
                }
                .into();
                fail(&err, true, request)
            }
        }
    }
}

/// Turn a failure into an error envelope, logging it by category
pub(crate) fn fail(err: &GatewayError, rest: bool, request: &InboundRequest) -> Reshaped {
    if err.is_configuration() {
        tracing::error!(
            method = %request.method,
            route = %request.route_pattern,
            error = %err,
            "configuration error, check the registry against the schema"
        );
    } else {
        tracing::debug!(
            method = %request.method,
            route = %request.route_pattern,
            error = %err,
            "request rejected"
        );
    }
    reshape_error(err, rest)
}

/// REST mode from the raw body
pub(crate) async fn dispatch_rest_raw(
    host: &GatewayHost,
    request: &InboundRequest,
    enforce_query: bool,
) -> Reshaped {
    match decode_body(&request.body) {
        Ok(body) => dispatch_rest(host, request, body, enforce_query).await,
        Err(e) => fail(&e.into(), true, request),
    }
}

/// REST mode: merge, synthesize, execute, reshape
pub(crate) async fn dispatch_rest(
    host: &GatewayHost,
    request: &InboundRequest,
    body: Map<String, Value>,
    enforce_query: bool,
) -> Reshaped {
    match rest_pipeline(host, request, body, enforce_query).await {
        Ok(reshaped) => reshaped,
        Err(err) => fail(&err, true, request),
    }
}

async fn rest_pipeline(
    host: &GatewayHost,
    request: &InboundRequest,
    body: Map<String, Value>,
    enforce_query: bool,
) -> GatewayResult<Reshaped> {
    let method = request.method.as_str();
    let operation = match host
        .registry
        .operation_for_route(method, &request.route_pattern)
    {
        Some(operation) => operation,
        None if request.route_pattern == host.settings.graphql_path => {
            return Err(RequestError::MissingQuery.into());
        }
        None => {
            return Err(ConfigError::UnknownOperation {
                method: method.to_string(),
                route: request.route_pattern.clone(),
            }
            .into());
        }
    };

    if enforce_query && host.registry.operation_kind(operation) == Some(OperationKind::Mutation) {
        return Err(RequestError::MutationOverGet {
            operation: operation.to_string(),
        }
        .into());
    }

    let bag = ParameterMerger::merge_decoded(&request.query_pairs, &request.path_params, body);
    trace_stage(Stage::ParamsMerged, request);

    let mut document = QuerySynthesizer::new(&host.registry).synthesize(method, operation, &bag)?;
    document.read_time.start = request.received_at;
    trace_stage(Stage::QuerySynthesized, request);

    tracing::debug!(
        method = %method,
        route = %request.route_pattern,
        operation = %operation,
        "executing synthesized document"
    );

    execute(host, request, document.into_request(), true).await
}

/// Native mode: the client sent the document itself
pub(crate) async fn dispatch_native(
    host: &GatewayHost,
    request: &InboundRequest,
    mut graphql: GraphQLRequest,
    enforce_query: bool,
) -> Reshaped {
    if enforce_query {
        // unparseable documents go to the engine, which reports them
        if let Ok(info) = document::inspect(&graphql.query, graphql.operation_name.as_deref()) {
            if info.kind == OperationKind::Mutation {
                let operation = graphql
                    .operation_name
                    .clone()
                    .or_else(|| info.root_fields.first().cloned())
                    .unwrap_or_default();
                let err = RequestError::MutationOverGet { operation }.into();
                return fail(&err, false, request);
            }
        }
    }

    graphql.read_time = Some(ReadTime {
        start: request.received_at,
        end: Utc::now(),
    });
    trace_stage(Stage::QuerySynthesized, request);

    match execute(host, request, graphql, false).await {
        Ok(reshaped) => reshaped,
        Err(err) => fail(&err, false, request),
    }
}

async fn execute(
    host: &GatewayHost,
    request: &InboundRequest,
    graphql: GraphQLRequest,
    rest: bool,
) -> GatewayResult<Reshaped> {
    let execution = host.executor.execute(graphql).await?;
    trace_stage(Stage::Executed, request);

    let reshaped = reshape(execution, rest)?;
    trace_stage(Stage::Reshaped, request);

    Ok(reshaped)
}

/// Decode an optional JSON object carried in a query-string field
pub(crate) fn decode_object_param(
    request: &InboundRequest,
    key: &'static str,
) -> Result<Option<Map<String, Value>>, RequestError> {
    match request.query_value(key) {
        None | Some("") => Ok(None),
        Some(raw) => serde_json::from_str::<Option<Map<String, Value>>>(raw).map_err(|e| {
            RequestError::InvalidJson {
                what: key,
                message: e.to_string(),
            }
        }),
    }
}

/// A native request read from the query string, `None` when `query` is absent
pub(crate) fn native_from_query(request: &InboundRequest) -> GatewayResult<Option<GraphQLRequest>> {
    let Some(query) = request.query_value("query").filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    Ok(Some(GraphQLRequest {
        query: query.to_string(),
        operation_name: request
            .query_value("operationName")
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        variables: decode_object_param(request, "variables")?,
        extensions: decode_object_param(request, "extensions")?,
        read_time: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegistryConfig, ServerSettings};
    use crate::core::executor::StaticExecutor;
    use crate::core::registry::TypeRegistry;
    use crate::core::reshaper::Envelope;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    fn host(executor: StaticExecutor) -> GatewayHost {
        GatewayHost::new(
            TypeRegistry::from_config(RegistryConfig::default_config()).unwrap(),
            Arc::new(executor),
            ServerSettings::default(),
        )
    }

    async fn inbound(method: Method, uri: &str) -> InboundRequest {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        InboundRequest::from_request(request, 1024).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_chain_rejects() {
        let host = host(StaticExecutor::new());
        let request = inbound(Method::GET, "/todos").await;

        let reshaped = TransportChain::new().dispatch(&host, &request).await;
        assert_eq!(reshaped.status, StatusCode::BAD_REQUEST);
        match reshaped.envelope {
            Envelope::Rest(envelope) => assert_eq!(envelope.code, 400),
            other => panic!("unexpected envelope {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_config_error() {
        let host = host(StaticExecutor::new());
        let request = inbound(Method::GET, "/nope").await;

        let reshaped = dispatch_rest_raw(&host, &request, true).await;
        assert_eq!(reshaped.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&reshaped.envelope).unwrap();
        assert_eq!(body["code"], json!(422));
        assert_eq!(body["message"], json!("unknown operation: GET /nope"));
    }

    #[tokio::test]
    async fn test_graphql_endpoint_without_query_is_request_error() {
        let host = host(StaticExecutor::new());
        let request = inbound(Method::GET, "/graphql").await;

        let reshaped = dispatch_rest_raw(&host, &request, true).await;
        assert_eq!(reshaped.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&reshaped.envelope).unwrap();
        assert_eq!(body["code"], json!(400));
        assert_eq!(body["codestr"], json!("MISSING_QUERY"));
    }

    #[tokio::test]
    async fn test_native_from_query_decodes_variables() {
        let request = inbound(
            Method::GET,
            "/graphql?query=%7Btodos%7Bid%7D%7D&variables=%7B%22a%22%3A1%7D&operationName=",
        )
        .await;
        let graphql = native_from_query(&request).unwrap().unwrap();
        assert_eq!(graphql.query, "{todos{id}}");
        assert_eq!(graphql.variables.unwrap()["a"], json!(1));
        assert!(graphql.operation_name.is_none());
    }

    #[tokio::test]
    async fn test_native_from_query_rejects_bad_variables() {
        let request = inbound(Method::GET, "/graphql?query=%7Ba%7D&variables=nope").await;
        let err = native_from_query(&request).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.envelope_code(), 422);
    }

    #[tokio::test]
    async fn test_no_query_means_rest_mode() {
        let request = inbound(Method::GET, "/todos?done=true").await;
        assert!(native_from_query(&request).unwrap().is_none());
    }

    #[test]
    fn test_standard_chain() {
        assert_eq!(TransportChain::standard().len(), 3);
        assert!(TransportChain::new().is_empty());
    }
}
