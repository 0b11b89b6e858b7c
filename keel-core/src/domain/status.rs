//! Live stack status
//!
//! Read fresh from the manifest runner on every request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compose reports a healthy container in this state
pub const RUNNING_STATE: &str = "running";

/// Point-in-time view of a stack's containers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackStatus {
    pub deployed: bool,
    /// Every service running with a zero exit code
    pub all_green: bool,
    /// Keyed by container id
    pub services: BTreeMap<String, ServiceState>,
}

impl StackStatus {
    pub fn not_deployed() -> Self {
        Self {
            deployed: false,
            all_green: false,
            services: BTreeMap::new(),
        }
    }

    /// Build a status from the per-container states reported by the runner.
    ///
    /// An empty report means nothing is running.
    pub fn from_services(services: BTreeMap<String, ServiceState>) -> Self {
        if services.is_empty() {
            return Self::not_deployed();
        }

        let all_green = services.values().all(ServiceState::is_green);

        Self {
            deployed: true,
            all_green,
            services,
        }
    }

    /// Deployed, but at least one service is not healthy
    pub fn is_degraded(&self) -> bool {
        self.deployed && !self.all_green
    }
}

/// State of one container belonging to a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceState {
    pub service: String,
    pub state: String,
    pub exit_code: i32,
    /// Human readable status, e.g. "Up 3 minutes"
    pub status: String,
    pub container_name: String,
    pub container_id: String,
}

impl ServiceState {
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case(RUNNING_STATE)
    }

    pub fn is_green(&self) -> bool {
        self.is_running() && self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(state: &str, exit_code: i32) -> ServiceState {
        ServiceState {
            service: "web".to_string(),
            state: state.to_string(),
            exit_code,
            status: String::new(),
            container_name: "web-1".to_string(),
            container_id: "abc".to_string(),
        }
    }

    #[test]
    fn test_empty_report_is_not_deployed() {
        let status = StackStatus::from_services(BTreeMap::new());
        assert_eq!(status, StackStatus::not_deployed());
    }

    #[test]
    fn test_all_green_requires_running_and_zero_exit() {
        let mut services = BTreeMap::new();
        services.insert("a".to_string(), service("running", 0));
        assert!(StackStatus::from_services(services.clone()).all_green);

        services.insert("b".to_string(), service("exited", 1));
        let status = StackStatus::from_services(services);
        assert!(status.deployed);
        assert!(!status.all_green);
        assert!(status.is_degraded());
    }
}
