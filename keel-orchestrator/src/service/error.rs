//! Service error type
//!
//! One enum for every stack and edge operation. Store and runner errors are
//! folded into the domain variants where they have a domain meaning.

use keel_compose::RunnerError;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::StoreError;

pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("Stack with ID {0} not found")]
    StackNotFound(Uuid),

    #[error("Stack dependency with ID {0} not found")]
    DependencyNotFound(Uuid),

    #[error("Stack with ID {stack_id} cannot depend on itself")]
    SelfDependency { stack_id: Uuid },

    #[error(
        "Stack with ID {depends_on_stack_id} already depends on stack with ID {stack_id}, cyclic dependency detected"
    )]
    CycleDetected {
        stack_id: Uuid,
        depends_on_stack_id: Uuid,
    },

    #[error("Stack with ID {stack_id} already depends on stack with ID {depends_on_stack_id}")]
    DuplicateEdge {
        stack_id: Uuid,
        depends_on_stack_id: Uuid,
    },

    #[error("{0}")]
    InvalidRequest(String),

    /// The target was torn down again before this was returned
    #[error("Failed to deploy stack with ID {stack_id}: {reason}")]
    DeployFailed { stack_id: Uuid, reason: String },

    #[error("Failed to tear down stack with ID {stack_id}: {reason}")]
    TeardownFailed { stack_id: Uuid, reason: String },

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Runner(RunnerError),
}

impl StackError {
    /// Rejected before anything was changed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::StackNotFound(_)
                | Self::DependencyNotFound(_)
                | Self::SelfDependency { .. }
                | Self::CycleDetected { .. }
                | Self::DuplicateEdge { .. }
                | Self::InvalidRequest(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StackNotFound(_) | Self::DependencyNotFound(_))
    }
}

impl From<StoreError> for StackError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StackNotFound(id) | StoreError::MissingStack(id) => {
                StackError::StackNotFound(id)
            }
            StoreError::DependencyNotFound(id) => StackError::DependencyNotFound(id),
            StoreError::DuplicateDependency {
                stack_id,
                depends_on_stack_id,
            } => StackError::DuplicateEdge {
                stack_id,
                depends_on_stack_id,
            },
            other => StackError::Store(other),
        }
    }
}

impl From<RunnerError> for StackError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::InvalidManifest { reason } => {
                StackError::InvalidRequest(format!("Invalid manifest: {}", reason))
            }
            other => StackError::Runner(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_both_stacks() {
        let stack_id = Uuid::new_v4();
        let depends_on_stack_id = Uuid::new_v4();
        let err = StackError::CycleDetected {
            stack_id,
            depends_on_stack_id,
        };

        let message = err.to_string();
        assert!(message.contains(&stack_id.to_string()));
        assert!(message.contains(&depends_on_stack_id.to_string()));
        assert!(err.is_validation());
    }

    #[test]
    fn test_store_errors_map_to_domain() {
        let id = Uuid::new_v4();
        assert!(matches!(
            StackError::from(StoreError::MissingStack(id)),
            StackError::StackNotFound(found) if found == id
        ));
        assert!(matches!(
            StackError::from(StoreError::DuplicateDependency {
                stack_id: id,
                depends_on_stack_id: id,
            }),
            StackError::DuplicateEdge { .. }
        ));
    }

    #[test]
    fn test_invalid_manifest_is_bad_request() {
        let err = StackError::from(RunnerError::invalid_manifest("no services"));
        assert!(matches!(err, StackError::InvalidRequest(ref msg) if msg.contains("no services")));

        let err = StackError::DeployFailed {
            stack_id: Uuid::new_v4(),
            reason: "unhealthy".to_string(),
        };
        assert!(!err.is_validation());
    }
}
