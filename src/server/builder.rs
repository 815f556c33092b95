//! ServerBuilder for fluent API to build the gateway server

use super::exposure::RestExposure;
use super::host::GatewayHost;
use crate::config::{GatewayConfig, RegistryConfig, ServerSettings};
use crate::core::executor::GraphQLExecutor;
use crate::core::registry::TypeRegistry;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the gateway HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(GatewayConfig::from_yaml_file("gateway.yaml")?)
///     .with_executor(StaticExecutor::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    executor: Option<Arc<dyn GraphQLExecutor>>,
    configs: Vec<RegistryConfig>,
    registry: Option<TypeRegistry>,
    settings: ServerSettings,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            executor: None,
            configs: Vec::new(),
            registry: None,
            settings: ServerSettings::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the execution engine (required)
    pub fn with_executor(mut self, executor: impl GraphQLExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Set an already shared execution engine
    pub fn with_shared_executor(mut self, executor: Arc<dyn GraphQLExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Add a gateway configuration: its registry tables are merged with any
    /// others added, and its server settings replace the current ones
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.settings = config.server;
        self.configs.push(config.registry);
        self
    }

    /// Add registry tables only
    pub fn with_registry_config(mut self, config: RegistryConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Use a prebuilt registry instead of building one from configuration
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_settings(mut self, settings: ServerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes outside the registry, such as readiness probes or
    /// admin endpoints.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{Router, routing::get};
    ///
    /// let admin = Router::new().route("/admin/version", get(|| async { "0.0.9" }));
    ///
    /// ServerBuilder::new()
    ///     .with_executor(executor)
    ///     .with_custom_routes(admin)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Registry validation happens here, so a registry that does not resolve
    /// fails before any request is served.
    pub fn build_host(mut self) -> Result<GatewayHost> {
        let executor = self
            .executor
            .take()
            .ok_or_else(|| anyhow::anyhow!("GraphQLExecutor is required. Call .with_executor()"))?;

        let registry = match self.registry.take() {
            Some(registry) => registry,
            None => {
                let merged = RegistryConfig::merge(std::mem::take(&mut self.configs));
                TypeRegistry::from_config(merged).context("invalid registry configuration")?
            }
        };

        tracing::info!(
            executor = executor.name(),
            routes = registry.routes().len(),
            graphql_path = %self.settings.graphql_path,
            "gateway host built"
        );

        Ok(GatewayHost::new(registry, executor, self.settings))
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Gateway listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Gateway shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::StaticExecutor;

    #[test]
    fn test_build_host_requires_executor() {
        let result = ServerBuilder::new()
            .with_registry_config(RegistryConfig::default_config())
            .build_host();
        let err = result.err().unwrap();
        assert!(err.to_string().contains("GraphQLExecutor is required"));
    }

    #[test]
    fn test_build_host_merges_configs() {
        let extra = RegistryConfig::from_yaml_str(
            r#"
operations:
  stats: { selection: "{count}" }
routes:
  - { method: GET, path: /stats, operation: stats }
"#,
        )
        .unwrap();

        let host = ServerBuilder::new()
            .with_executor(StaticExecutor::new())
            .with_registry_config(RegistryConfig::default_config())
            .with_registry_config(extra)
            .build_host()
            .unwrap();

        assert_eq!(host.route_count(), 6);
        assert_eq!(host.registry.operation_for_route("GET", "/stats"), Some("stats"));
    }

    #[test]
    fn test_invalid_registry_fails_build() {
        let broken = RegistryConfig::from_yaml_str(
            "operations:\n  todos:\n    arguments:\n      filter: Missing\n",
        )
        .unwrap();

        let result = ServerBuilder::new()
            .with_executor(StaticExecutor::new())
            .with_registry_config(broken)
            .build_host();
        assert!(result.is_err());
    }

    #[test]
    fn test_with_config_applies_settings() {
        let config = GatewayConfig::from_yaml_str("server:\n  graphql_path: /gql\n").unwrap();
        let host = ServerBuilder::new()
            .with_executor(StaticExecutor::new())
            .with_config(config)
            .build_host()
            .unwrap();
        assert_eq!(host.settings.graphql_path, "/gql");
        assert_eq!(host.route_count(), 0);
    }

    #[test]
    fn test_build_router() {
        let router = ServerBuilder::new()
            .with_executor(StaticExecutor::new())
            .with_registry_config(RegistryConfig::default_config())
            .build();
        assert!(router.is_ok());
    }

    #[test]
    fn test_bad_route_path_fails_build() {
        let config = RegistryConfig::from_yaml_str(
            r#"
operations:
  ping: { selection: "" }
routes:
  - { method: GET, path: ping, operation: ping }
"#,
        )
        .unwrap();
        let result = ServerBuilder::new()
            .with_executor(StaticExecutor::new())
            .with_registry_config(config)
            .build();
        assert!(result.is_err());
    }
}
