//! Router builder for registry routes

use crate::server::exposure::rest::{GatewayState, gateway_handler};
use anyhow::{Result, bail};
use axum::Router;
use axum::routing::{MethodFilter, MethodRouter};
use indexmap::IndexMap;

/// Build one route per registry route plus the native GraphQL endpoint
///
/// Registry routes use Axum's pattern syntax (`/todos/{id}`). The GraphQL
/// endpoint answers GET and POST; if a registry route shares its path the
/// methods are merged onto one route.
pub fn build_gateway_routes(state: GatewayState) -> Result<Router> {
    let mut methods: IndexMap<String, Vec<String>> = IndexMap::new();

    let graphql_path = state.host.settings.graphql_path.clone();
    methods
        .entry(graphql_path)
        .or_default()
        .extend(["GET".to_string(), "POST".to_string()]);

    for route in state.host.registry.routes() {
        let entry = methods.entry(route.path.clone()).or_default();
        if !entry.contains(&route.method) {
            entry.push(route.method.clone());
        }
    }

    let mut router = Router::new();
    for (path, path_methods) in methods {
        if !path.starts_with('/') {
            bail!("Route path '{}' must start with '/'", path);
        }

        let mut method_router = MethodRouter::new();
        for method in &path_methods {
            method_router = method_router.on(method_filter(method)?, gateway_handler);
        }

        tracing::debug!(path = %path, methods = ?path_methods, "registering gateway route");
        router = router.route(&path, method_router);
    }

    Ok(router.with_state(state))
}

fn method_filter(method: &str) -> Result<MethodFilter> {
    Ok(match method {
        "GET" => MethodFilter::GET,
        "POST" => MethodFilter::POST,
        "PUT" => MethodFilter::PUT,
        "PATCH" => MethodFilter::PATCH,
        "DELETE" => MethodFilter::DELETE,
        other => bail!("Unsupported route method '{}'", other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_filter() {
        assert!(method_filter("GET").is_ok());
        assert!(method_filter("DELETE").is_ok());
        assert!(method_filter("TRACE").is_err());
    }
}
