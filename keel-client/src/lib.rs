//! Keel HTTP Client
//!
//! A type-safe HTTP client for the Keel orchestrator API, used by the CLI
//! and by scripts that drive stacks programmatically.
//!
//! # Example
//!
//! ```no_run
//! use keel_client::OrchestratorClient;
//! use keel_core::dto::stack::CreateStack;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestratorClient::new("http://localhost:8080");
//!
//!     let stack = client.create_stack(CreateStack {
//!         name: "web".to_string(),
//!         code: "services:\n  web:\n    image: nginx\n".to_string(),
//!         cwd: None,
//!         notes: String::new(),
//!     }).await?;
//!
//!     client.deploy_stack(stack.id, true).await?;
//!     Ok(())
//! }
//! ```

mod dependencies;
pub mod error;
mod stacks;

// Re-export commonly used types
pub use error::{ClientError, Result};

use keel_core::dto::response::DataResponse;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Header carrying the orchestrator API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for the Keel orchestrator API
///
/// Methods are grouped by resource:
/// - Stack management and orchestration (deploy, teardown, status, trees)
/// - Stack dependency edges
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// Sent as `x-api-key` on every API request when set
    api_key: Option<String>,
    client: Client,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        }
    }

    /// Authenticate every request with the given API key
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the orchestrator is up
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    /// Start a request against `/api/v1{path}`
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/v1{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and unwrap the `data` field of the envelope
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_body(status.as_u16(), &body));
        }

        response
            .json::<DataResponse<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_body(status.as_u16(), &body));
        }

        Ok(())
    }
}
