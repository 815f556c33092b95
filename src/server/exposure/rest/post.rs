//! POST / PUT / PATCH transport
//!
//! The body must be `application/json`. A body carrying a non-empty `query`
//! is a native GraphQL request; any other object is REST parameters.

use super::inbound::InboundRequest;
use super::transport::{Transport, dispatch_native, dispatch_rest, fail};
use crate::core::error::RequestError;
use crate::core::merger::decode_body;
use crate::core::reshaper::Reshaped;
use crate::core::response::GraphQLRequest;
use crate::server::host::GatewayHost;
use async_trait::async_trait;
use axum::http::Method;
use serde_json::Value;

pub struct PostTransport;

#[async_trait]
impl Transport for PostTransport {
    fn name(&self) -> &'static str {
        "POST"
    }

    fn supports(&self, request: &InboundRequest) -> bool {
        !request.is_upgrade()
            && request.is_json()
            && matches!(request.method, Method::POST | Method::PUT | Method::PATCH)
    }

    async fn dispatch(&self, host: &GatewayHost, request: &InboundRequest) -> Reshaped {
        let body = match decode_body(&request.body) {
            Ok(body) => body,
            Err(e) => return fail(&e.into(), true, request),
        };

        let native = matches!(body.get("query"), Some(Value::String(q)) if !q.is_empty());
        if !native {
            return dispatch_rest(host, request, body, false).await;
        }

        match serde_json::from_value::<GraphQLRequest>(Value::Object(body)) {
            Ok(graphql) => dispatch_native(host, request, graphql, false).await,
            Err(e) => {
                let err = RequestError::InvalidJson {
                    what: "json body",
                    message: e.to_string(),
                }
                .into();
                fail(&err, false, request)
            }
        }
    }
}
