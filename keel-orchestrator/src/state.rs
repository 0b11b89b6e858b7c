//! Shared application state
//!
//! Built once in `main` and cloned into every request handler.

use std::sync::Arc;

use keel_compose::ManifestRunner;

use crate::repository::StackStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StackStore>,
    pub runner: Arc<dyn ManifestRunner>,
    /// Expected `x-api-key` value, if auth is enabled
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn StackStore>, runner: Arc<dyn ManifestRunner>) -> Self {
        Self {
            store,
            runner,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.map(Arc::from);
        self
    }
}
