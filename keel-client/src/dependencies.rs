//! Stack dependency endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use keel_core::domain::stack::StackDependency;
use keel_core::dto::dependency::{
    CreateStackDependency, StackDependencyBody, StackDependencyListBody, UpdateStackDependency,
};
use reqwest::Method;
use uuid::Uuid;

impl OrchestratorClient {
    // =============================================================================
    // Dependency Edges
    // =============================================================================

    /// Add an edge; fails with `cyclic_dependency` if it would close a loop
    pub async fn add_dependency(&self, req: CreateStackDependency) -> Result<StackDependency> {
        let response = self
            .request(Method::POST, "/stack_dependency")
            .json(&req)
            .send()
            .await?;

        let body: StackDependencyBody = self.handle_response(response).await?;
        Ok(body.stack_dependency)
    }

    /// List edges, optionally filtered by either endpoint
    pub async fn list_dependencies(
        &self,
        stack_id: Option<Uuid>,
        depends_on_stack_id: Option<Uuid>,
    ) -> Result<Vec<StackDependency>> {
        let mut query = Vec::new();
        if let Some(id) = stack_id {
            query.push(("stack_id", id));
        }
        if let Some(id) = depends_on_stack_id {
            query.push(("depends_on_stack_id", id));
        }

        let response = self
            .request(Method::GET, "/stack_dependency")
            .query(&query)
            .send()
            .await?;

        let body: StackDependencyListBody = self.handle_response(response).await?;
        Ok(body.stack_dependencies)
    }

    pub async fn get_dependency(&self, id: Uuid) -> Result<StackDependency> {
        let path = format!("/stack_dependency/{}", id);
        let response = self.request(Method::GET, &path).send().await?;

        let body: StackDependencyBody = self.handle_response(response).await?;
        Ok(body.stack_dependency)
    }

    pub async fn update_dependency(
        &self,
        id: Uuid,
        patch: UpdateStackDependency,
    ) -> Result<StackDependency> {
        let path = format!("/stack_dependency/{}", id);
        let response = self
            .request(Method::PATCH, &path)
            .json(&patch)
            .send()
            .await?;

        let body: StackDependencyBody = self.handle_response(response).await?;
        Ok(body.stack_dependency)
    }

    pub async fn delete_dependency(&self, id: Uuid) -> Result<()> {
        let path = format!("/stack_dependency/{}", id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::OrchestratorClient;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_list_filters_sent_as_query() {
        let stack_id = Uuid::new_v4();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/stack_dependency")
            .match_query(mockito::Matcher::UrlEncoded(
                "stack_id".into(),
                stack_id.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":200,"data":{"stack_dependencies":[]}}"#)
            .create_async()
            .await;

        let client = OrchestratorClient::new(server.url());
        let edges = client.list_dependencies(Some(stack_id), None).await.unwrap();

        assert!(edges.is_empty());
        mock.assert_async().await;
    }
}
