//! Server module for building the gateway HTTP server
//!
//! `ServerBuilder` validates the registry, builds a `GatewayHost` and exposes
//! it over REST: one route per registry route, the native GraphQL endpoint and
//! health checks.

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::GatewayHost;
