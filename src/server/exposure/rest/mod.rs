//! REST exposure for the gateway
//!
//! Consumes a `GatewayHost` and produces an Axum `Router` serving the health
//! checks, the native GraphQL endpoint and every registry route. All gateway
//! routes share one handler; the transport chain decides what happens next.

pub mod delete;
pub mod get;
pub mod handler;
pub mod inbound;
pub mod post;
pub mod transport;
pub mod writer;

pub use handler::{GatewayState, gateway_handler};
pub use inbound::InboundRequest;
pub use transport::{Stage, Transport, TransportChain};

use super::super::host::GatewayHost;
use crate::server::router::build_gateway_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The gateway host
    /// * `custom_routes` - Additional custom routes to merge
    ///
    /// # Returns
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - Custom routes
    /// - The native GraphQL endpoint
    /// - One route per registry route
    pub fn build_router(host: Arc<GatewayHost>, custom_routes: Vec<Router>) -> Result<Router> {
        Self::build_router_with_transports(host, custom_routes, TransportChain::standard())
    }

    /// Same as [`build_router`](Self::build_router) with a caller-supplied transport chain
    pub fn build_router_with_transports(
        host: Arc<GatewayHost>,
        custom_routes: Vec<Router>,
        transports: TransportChain,
    ) -> Result<Router> {
        let state = GatewayState::new(host, transports);

        let mut app = Self::health_routes();

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app = app.merge(build_gateway_routes(state)?);

        Ok(app
            .layer(CatchPanicLayer::custom(writer::handle_panic))
            .layer(TraceLayer::new_for_http()))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "gql-rest"
        }))
    }
}
