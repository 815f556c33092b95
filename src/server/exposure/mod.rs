//! API exposure modules
//!
//! Each exposure consumes a `GatewayHost` and produces a Router.

pub mod rest;

pub use rest::RestExposure;
