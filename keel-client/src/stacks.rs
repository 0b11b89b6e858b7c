//! Stack endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use keel_core::domain::stack::Stack;
use keel_core::domain::status::StackStatus;
use keel_core::domain::tree::{DependencyTree, DependentTree};
use keel_core::dto::deploy::{DeployOutcome, StatusBody, TeardownAllBody, TeardownOutcome};
use keel_core::dto::dependency::{DependencyTreeBody, DependentTreeBody};
use keel_core::dto::stack::{CreateStack, StackBody, StackListBody, UpdateStack};
use reqwest::Method;
use uuid::Uuid;

impl OrchestratorClient {
    // =============================================================================
    // Stack Management
    // =============================================================================

    /// Create a new stack; the manifest is validated server side
    pub async fn create_stack(&self, req: CreateStack) -> Result<Stack> {
        let response = self.request(Method::POST, "/stack").json(&req).send().await?;

        let body: StackBody = self.handle_response(response).await?;
        Ok(body.stack)
    }

    /// List all stacks, oldest first
    pub async fn list_stacks(&self) -> Result<Vec<Stack>> {
        let response = self.request(Method::GET, "/stack").send().await?;

        let body: StackListBody = self.handle_response(response).await?;
        Ok(body.stacks)
    }

    pub async fn get_stack(&self, stack_id: Uuid) -> Result<Stack> {
        let path = format!("/stack/{}", stack_id);
        let response = self.request(Method::GET, &path).send().await?;

        let body: StackBody = self.handle_response(response).await?;
        Ok(body.stack)
    }

    /// Apply a partial update; absent fields are left untouched
    pub async fn update_stack(&self, stack_id: Uuid, patch: UpdateStack) -> Result<Stack> {
        let path = format!("/stack/{}", stack_id);
        let response = self
            .request(Method::PATCH, &path)
            .json(&patch)
            .send()
            .await?;

        let body: StackBody = self.handle_response(response).await?;
        Ok(body.stack)
    }

    pub async fn delete_stack(&self, stack_id: Uuid) -> Result<()> {
        let path = format!("/stack/{}", stack_id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Orchestration
    // =============================================================================

    /// Deploy a stack
    ///
    /// # Arguments
    /// * `stack_id` - Stack to deploy
    /// * `deploy_dependents` - Bring dependents back up after the stack is up
    pub async fn deploy_stack(&self, stack_id: Uuid, deploy_dependents: bool) -> Result<DeployOutcome> {
        let path = format!("/stack/{}/deploy", stack_id);
        let response = self
            .request(Method::POST, &path)
            .query(&[("deploy_dependents", deploy_dependents)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Tear down a stack and everything that depends on it
    pub async fn teardown_stack(&self, stack_id: Uuid) -> Result<TeardownOutcome> {
        let path = format!("/stack/{}/teardown", stack_id);
        let response = self.request(Method::POST, &path).send().await?;

        self.handle_response(response).await
    }

    /// Tear down every stack; per-stack failures are in the outcomes
    pub async fn teardown_all_stacks(&self) -> Result<Vec<TeardownOutcome>> {
        let response = self.request(Method::POST, "/stack/teardown").send().await?;

        let body: TeardownAllBody = self.handle_response(response).await?;
        Ok(body.outcomes)
    }

    pub async fn stack_status(&self, stack_id: Uuid) -> Result<StackStatus> {
        let path = format!("/stack/{}/status", stack_id);
        let response = self.request(Method::GET, &path).send().await?;

        let body: StatusBody = self.handle_response(response).await?;
        Ok(body.status)
    }

    pub async fn dependency_tree(&self, stack_id: Uuid) -> Result<DependencyTree> {
        let path = format!("/stack/{}/dependencies", stack_id);
        let response = self.request(Method::GET, &path).send().await?;

        let body: DependencyTreeBody = self.handle_response(response).await?;
        Ok(body.tree)
    }

    pub async fn dependent_tree(&self, stack_id: Uuid) -> Result<DependentTree> {
        let path = format!("/stack/{}/dependents", stack_id);
        let response = self.request(Method::GET, &path).send().await?;

        let body: DependentTreeBody = self.handle_response(response).await?;
        Ok(body.tree)
    }
}

#[cfg(test)]
mod tests {
    use crate::OrchestratorClient;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_get_stack_unwraps_envelope() {
        let id = Uuid::new_v4();
        let body = serde_json::json!({
            "status": 200,
            "data": {
                "stack": {
                    "id": id,
                    "name": "web",
                    "code": "services: {}",
                    "cwd": null,
                    "notes": "",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                }
            }
        });

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/api/v1/stack/{}", id).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = OrchestratorClient::new(server.url());
        let stack = client.get_stack(id).await.unwrap();
        assert_eq!(stack.id, id);
        assert_eq!(stack.name, "web");
    }

    #[tokio::test]
    async fn test_deploy_failure_surfaces_code() {
        let id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", format!("/api/v1/stack/{}/deploy", id).as_str())
            .match_query(mockito::Matcher::UrlEncoded(
                "deploy_dependents".into(),
                "false".into(),
            ))
            .with_status(502)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":502,"message":"Failed to deploy","errors":[{"code":"deploy_failed","message":"Failed to deploy"}]}"#,
            )
            .create_async()
            .await;

        let client = OrchestratorClient::new(server.url());
        let err = client.deploy_stack(id, false).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.code(), Some("deploy_failed"));
    }

    #[tokio::test]
    async fn test_delete_missing_stack() {
        let id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", format!("/api/v1/stack/{}", id).as_str())
            .with_status(404)
            .with_body(r#"{"status":404,"message":"not found","errors":[{"code":"not_found","message":"not found"}]}"#)
            .create_async()
            .await;

        let client = OrchestratorClient::new(server.url());
        let err = client.delete_stack(id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
