//! Manifest runner contract
//!
//! The orchestrator only ever talks to containers through this trait, so
//! tests can swap in an in-memory runner.

use async_trait::async_trait;
use keel_core::domain::status::ServiceState;
use keel_core::dto::deploy::RunOutput;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::manifest::Manifest;

/// Runs compose manifests against a container runtime
#[async_trait]
pub trait ManifestRunner: Send + Sync {
    /// Parse and check a manifest without touching the runtime
    ///
    /// # Arguments
    /// * `code` - Manifest text
    /// * `cwd` - Working directory the manifest will be run from, if any
    async fn validate_manifest(&self, code: &str, cwd: Option<&str>) -> Result<Manifest>;

    /// Create and start every service in the manifest
    async fn bring_up(&self, code: &str, cwd: Option<&str>) -> Result<RunOutput>;

    /// Stop and remove every container of the manifest's project
    async fn tear_down(&self, code: &str, cwd: Option<&str>) -> Result<RunOutput>;

    /// List the containers of the manifest's project, stopped ones included
    ///
    /// An empty list means nothing is deployed.
    async fn query_status(&self, code: &str, cwd: Option<&str>) -> Result<Vec<ServiceProcess>>;
}

/// One container as reported by `compose ps --format json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProcess {
    #[serde(rename = "Service", default)]
    pub service_name: String,
    #[serde(rename = "State", default)]
    pub running_state: String,
    #[serde(rename = "ExitCode", default)]
    pub exit_code: i32,
    #[serde(rename = "Status", default)]
    pub status_text: String,
    #[serde(rename = "Name", default)]
    pub container_name: String,
    #[serde(rename = "ID", default)]
    pub container_id: String,
}

impl From<ServiceProcess> for ServiceState {
    fn from(process: ServiceProcess) -> Self {
        ServiceState {
            service: process.service_name,
            state: process.running_state,
            exit_code: process.exit_code,
            status: process.status_text,
            container_name: process.container_name,
            container_id: process.container_id,
        }
    }
}
