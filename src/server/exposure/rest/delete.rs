//! DELETE transport
//!
//! Reads parameters like GET but synthesizes a mutation and accepts a JSON
//! body of any content type.

use super::inbound::InboundRequest;
use super::transport::{Transport, dispatch_native, dispatch_rest_raw, fail, native_from_query};
use crate::core::reshaper::Reshaped;
use crate::server::host::GatewayHost;
use async_trait::async_trait;
use axum::http::Method;

pub struct DeleteTransport;

#[async_trait]
impl Transport for DeleteTransport {
    fn name(&self) -> &'static str {
        "DELETE"
    }

    fn supports(&self, request: &InboundRequest) -> bool {
        !request.is_upgrade() && request.method == Method::DELETE
    }

    async fn dispatch(&self, host: &GatewayHost, request: &InboundRequest) -> Reshaped {
        match native_from_query(request) {
            Ok(Some(graphql)) => dispatch_native(host, request, graphql, false).await,
            Ok(None) => dispatch_rest_raw(host, request, false).await,
            Err(err) => fail(&err, false, request),
        }
    }
}
