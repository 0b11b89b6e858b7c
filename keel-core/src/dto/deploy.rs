//! Deploy and teardown DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::stack::Stack;
use crate::domain::status::StackStatus;

/// Raw result of one manifest runner invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Result of a successful deploy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployOutcome {
    pub stack: Stack,
    pub result: RunOutput,
}

/// Result of a teardown, successful or not.
///
/// Teardown failures are carried here as data so that a cascade or a batch
/// sweep keeps going. `dependents` holds the cascaded teardowns that ran
/// before this stack was taken down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownOutcome {
    pub stack: Stack,
    pub result: Option<RunOutput>,
    pub error: Option<String>,
    #[serde(default)]
    pub dependents: Vec<TeardownOutcome>,
}

impl TeardownOutcome {
    pub fn succeeded(&self) -> bool {
        self.first_failure().is_none()
    }

    /// First failing stack in this outcome, dependents first
    pub fn first_failure(&self) -> Option<(Uuid, &str)> {
        self.dependents
            .iter()
            .find_map(TeardownOutcome::first_failure)
            .or_else(|| self.error.as_deref().map(|e| (self.stack.id, e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownAllBody {
    pub outcomes: Vec<TeardownOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: StackStatus,
}
