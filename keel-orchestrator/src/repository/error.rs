//! Store error type

use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by stack store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stack {0} not found")]
    StackNotFound(Uuid),

    #[error("Stack dependency {0} not found")]
    DependencyNotFound(Uuid),

    /// An edge references a stack that does not exist
    #[error("Stack {0} does not exist")]
    MissingStack(Uuid),

    #[error("Stack {stack_id} already depends on stack {depends_on_stack_id}")]
    DuplicateDependency {
        stack_id: Uuid,
        depends_on_stack_id: Uuid,
    },
}
