//! Server host for transport-agnostic API exposure
//!
//! `GatewayHost` holds everything a request needs: the immutable type
//! registry, the execution engine and the server settings. It is built once
//! and shared as `Arc<GatewayHost>` by every exposure.

use crate::config::ServerSettings;
use crate::core::executor::GraphQLExecutor;
use crate::core::registry::TypeRegistry;
use std::sync::Arc;

/// Host context containing all gateway state
///
/// # Example
///
/// ```rust,ignore
/// let host = GatewayHost::new(registry, Arc::new(StaticExecutor::new()), ServerSettings::default());
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct GatewayHost {
    /// Type registry, read-only once serving starts
    pub registry: Arc<TypeRegistry>,

    /// Engine the synthesized documents are sent to
    pub executor: Arc<dyn GraphQLExecutor>,

    pub settings: ServerSettings,
}

impl GatewayHost {
    pub fn new(
        registry: TypeRegistry,
        executor: Arc<dyn GraphQLExecutor>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            executor,
            settings,
        }
    }

    /// Number of REST routes the registry binds
    pub fn route_count(&self) -> usize {
        self.registry.routes().len()
    }
}
