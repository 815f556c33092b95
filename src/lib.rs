//! # gql-rest
//!
//! A REST to GraphQL translation gateway.
//!
//! REST clients call ordinary routes (`GET /todos?done=true`,
//! `POST /todos {"input": {...}}`); the gateway merges their parameters,
//! synthesizes a one-operation GraphQL document from a schema-derived type
//! registry, hands it to a GraphQL engine, and reshapes the engine's answer
//! into a flat `{code, message, data}` envelope. Native GraphQL clients can
//! use the same routes and get the engine response passed through.
//!
//! ## Features
//!
//! - **Type-directed encoding**: argument values are encoded by their declared
//!   GraphQL type, never guessed from the JSON shape
//! - **Impedance tolerance**: parameters the operation does not declare are ignored
//! - **Configuration-based**: registry tables and routes are loaded from YAML
//! - **Single envelope**: REST clients always get one flat JSON object
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gqlrest::prelude::*;
//!
//! let executor = StaticExecutor::new()
//!     .with_data("todos", serde_json::json!([{"id": "T1", "text": "buy milk", "done": false}]));
//!
//! ServerBuilder::new()
//!     .with_registry_config(RegistryConfig::default_config())
//!     .with_executor(executor)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//!
//! // GET /todos?done=false
//! //   -> query { todos(done:false){id,text,done} }
//! //   <- {"code":200,"data":[{"id":"T1","text":"buy milk","done":false}]}
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        encoder::ArgumentEncoder,
        error::{
            ConfigError, EncodingError, GatewayError, GatewayResult, RequestError, ReshapeError,
        },
        executor::{GraphQLExecutor, StaticExecutor},
        merger::ParameterMerger,
        registry::TypeRegistry,
        reshaper::{Envelope, Reshaped, reshape, reshape_error},
        response::{
            Execution, GraphQLEnvelope, GraphQLError, GraphQLRequest, GraphQLResponse,
            PathSegment, RestEnvelope,
        },
        synthesizer::{QueryDocument, QuerySynthesizer},
        types::{DeclaredType, OperationKind, TypeKind},
        value::{ParamValue, ParameterBag, Scalar},
    };

    // === Config ===
    pub use crate::config::{GatewayConfig, OperationConfig, RegistryConfig, RouteConfig, ServerSettings};

    // === Server ===
    pub use crate::server::exposure::rest::{InboundRequest, RestExposure, Transport, TransportChain};
    pub use crate::server::{GatewayHost, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;

    // === Axum ===
    pub use axum::{Router, routing::get};
}
