//! Core module containing the translation pipeline
//!
//! Request side: [`merger`] -> [`encoder`] (driven by [`registry`]) ->
//! [`synthesizer`]. Response side: [`executor`] -> [`reshaper`].

pub mod document;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod merger;
pub mod registry;
pub mod reshaper;
pub mod response;
pub mod scalars;
pub mod synthesizer;
pub mod types;
pub mod value;

pub use encoder::ArgumentEncoder;
pub use error::{ConfigError, EncodingError, GatewayError, GatewayResult, RequestError, ReshapeError};
pub use executor::{GraphQLExecutor, StaticExecutor};
pub use merger::ParameterMerger;
pub use registry::{OperationEntry, TypeRegistry, TypedFields};
pub use reshaper::{Envelope, Reshaped, reshape, reshape_error};
pub use response::{
    Execution, GraphQLEnvelope, GraphQLError, GraphQLRequest, GraphQLResponse, PathSegment,
    ReadTime, RestEnvelope,
};
pub use synthesizer::{QueryDocument, QuerySynthesizer};
pub use types::{DeclaredType, OperationKind, TypeKind};
pub use value::{ParamValue, ParameterBag, Scalar};
