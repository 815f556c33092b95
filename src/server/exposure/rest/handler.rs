//! Axum handler shared by every gateway route

use super::inbound::InboundRequest;
use super::transport::{Stage, TransportChain, trace_stage};
use crate::core::reshaper::reshape_error;
use crate::server::host::GatewayHost;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Router state: the host plus the transports requests are offered to
#[derive(Clone)]
pub struct GatewayState {
    pub host: Arc<GatewayHost>,
    pub transports: Arc<TransportChain>,
}

impl GatewayState {
    pub fn new(host: Arc<GatewayHost>, transports: TransportChain) -> Self {
        Self {
            host,
            transports: Arc::new(transports),
        }
    }
}

/// Snapshot the request, run it through the transport chain and write the envelope
pub async fn gateway_handler(State(state): State<GatewayState>, request: Request) -> Response {
    let inbound = match InboundRequest::from_request(request, state.host.settings.body_limit).await
    {
        Ok(inbound) => inbound,
        Err(err) => {
            tracing::debug!(error = %err, "request could not be read");
            return reshape_error(&err, true).into_response();
        }
    };

    let response = state
        .transports
        .dispatch(&state.host, &inbound)
        .await
        .into_response();
    trace_stage(Stage::Written, &inbound);

    response
}
