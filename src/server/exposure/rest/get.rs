//! GET transport
//!
//! A `query` field in the query string selects native mode; otherwise the
//! route's operation is synthesized. Only query operations may run over GET.

use super::inbound::InboundRequest;
use super::transport::{Transport, dispatch_native, dispatch_rest_raw, fail, native_from_query};
use crate::core::reshaper::Reshaped;
use crate::server::host::GatewayHost;
use async_trait::async_trait;
use axum::http::Method;

pub struct GetTransport;

#[async_trait]
impl Transport for GetTransport {
    fn name(&self) -> &'static str {
        "GET"
    }

    fn supports(&self, request: &InboundRequest) -> bool {
        !request.is_upgrade() && request.method == Method::GET
    }

    async fn dispatch(&self, host: &GatewayHost, request: &InboundRequest) -> Reshaped {
        match native_from_query(request) {
            Ok(Some(graphql)) => dispatch_native(host, request, graphql, true).await,
            Ok(None) => dispatch_rest_raw(host, request, true).await,
            Err(err) => fail(&err, false, request),
        }
    }
}
