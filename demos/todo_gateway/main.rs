//! Todo gateway example
//!
//! Serves the routes declared in `gateway.yaml` against an in-memory engine
//! with canned answers. Try:
//!
//! ```text
//! curl 'http://127.0.0.1:3000/todos?done=false'
//! curl -X POST http://127.0.0.1:3000/todos -H 'content-type: application/json' \
//!      -d '{"input": {"text": "buy milk"}}'
//! curl 'http://127.0.0.1:3000/graphql?query=%7Btodos%7Bid%7D%7D'
//! ```

use gqlrest::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/todo_gateway/gateway.yaml");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gqlrest=debug")),
        )
        .init();

    let config = GatewayConfig::from_yaml_file(CONFIG_PATH)?;

    let todos = json!([
        {"id": "T1", "text": "buy milk", "done": false},
        {"id": "T2", "text": "walk the dog", "done": true}
    ]);

    let executor = StaticExecutor::new()
        .with_paged_data("todos", todos.clone(), 2)
        .with_data("todo", todos[0].clone())
        .with_data("createTodo", json!({"id": "T3", "text": "buy milk", "done": false}))
        .with_data("updateTodo", json!({"id": "T1", "text": "buy milk", "done": true}))
        .with_data("deleteTodo", json!(true))
        .with_errors(
            "whitelist",
            vec![GraphQLError::new("whitelist is read-only").with_code(403)],
        );

    println!("Todo gateway on http://127.0.0.1:3000");
    for route in &config.registry.routes {
        println!("  {:<6} {:<14} -> {}", route.method, route.path, route.operation);
    }
    println!("  GET    {:<14} -> native GraphQL", config.server.graphql_path);
    println!("  POST   {:<14} -> native GraphQL", config.server.graphql_path);

    ServerBuilder::new()
        .with_config(config)
        .with_executor(executor)
        .serve("127.0.0.1:3000")
        .await
}
