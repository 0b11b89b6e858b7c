//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod dependency;
pub mod error;
pub mod extract;
pub mod health;
pub mod stack;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Stack endpoints
        .route("/stack", get(stack::list_stacks).post(stack::create_stack))
        .route("/stack/teardown", post(stack::teardown_all_stacks))
        .route(
            "/stack/{stack_id}",
            get(stack::get_stack)
                .patch(stack::update_stack)
                .delete(stack::delete_stack),
        )
        .route("/stack/{stack_id}/deploy", post(stack::deploy_stack))
        .route("/stack/{stack_id}/teardown", post(stack::teardown_stack))
        .route("/stack/{stack_id}/status", get(stack::get_stack_status))
        .route(
            "/stack/{stack_id}/dependencies",
            get(stack::get_dependency_tree),
        )
        .route("/stack/{stack_id}/dependents", get(stack::get_dependent_tree))
        // Dependency endpoints
        .route(
            "/stack_dependency",
            get(dependency::list_stack_dependencies).post(dependency::create_stack_dependency),
        )
        .route(
            "/stack_dependency/{id}",
            get(dependency::get_stack_dependency)
                .patch(dependency::update_stack_dependency)
                .delete(dependency::delete_stack_dependency),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{SAMPLE_MANIFEST, test_state};
    use serde_json::{Value, json};

    /// Serve the router on an ephemeral port and return its base URL
    async fn spawn(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn create(client: &reqwest::Client, base: &str, name: &str) -> String {
        let res = client
            .post(format!("{}/api/v1/stack", base))
            .json(&json!({ "name": name, "code": SAMPLE_MANIFEST }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], 201);
        body["data"]["stack"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let (state, _runner) = test_state();
        let base = spawn(state.with_api_key(Some("secret".to_string()))).await;

        let res = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let (state, _runner) = test_state();
        let base = spawn(state.with_api_key(Some("secret".to_string()))).await;
        let client = reqwest::Client::new();

        let res = client
            .get(format!("{}/api/v1/stack", base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 401);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "unauthorized");

        let res = client
            .get(format!("{}/api/v1/stack", base))
            .header("x-api-key", "secret")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn test_cycle_rejected_over_http() {
        let (state, _runner) = test_state();
        let base = spawn(state).await;
        let client = reqwest::Client::new();

        let a = create(&client, &base, "a").await;
        let b = create(&client, &base, "b").await;

        let res = client
            .post(format!("{}/api/v1/stack_dependency", base))
            .json(&json!({ "stack_id": b, "depends_on_stack_id": a }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);

        let res = client
            .post(format!("{}/api/v1/stack_dependency", base))
            .json(&json!({ "stack_id": a, "dependent_stack_id": b }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["errors"][0]["code"], "cyclic_dependency");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains(&a));
        assert!(message.contains(&b));
    }

    #[tokio::test]
    async fn test_deploy_and_status_over_http() {
        let (state, _runner) = test_state();
        let base = spawn(state).await;
        let client = reqwest::Client::new();

        let a = create(&client, &base, "a").await;

        let res = client
            .post(format!("{}/api/v1/stack/{}/deploy", base, a))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        let body: Value = client
            .get(format!("{}/api/v1/stack/{}/status", base, a))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["status"]["deployed"], true);
        assert_eq!(body["data"]["status"]["all_green"], true);
    }

    #[tokio::test]
    async fn test_missing_stack_is_404() {
        let (state, _runner) = test_state();
        let base = spawn(state).await;
        let client = reqwest::Client::new();
        let ghost = uuid::Uuid::new_v4();

        let res = client
            .delete(format!("{}/api/v1/stack/{}", base, ghost))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_requests_get_error_body() {
        let (state, _runner) = test_state();
        let base = spawn(state).await;
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{}/api/v1/stack", base))
            .json(&json!({ "name": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], 400);
        assert_eq!(body["errors"][0]["code"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("code"));

        let res = client
            .get(format!("{}/api/v1/stack/not-a-uuid", base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "invalid_request");

        let res = client
            .get(format!("{}/api/v1/stack_dependency?stack_id=nope", base))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "invalid_request");
    }
}
