//! Repository Module
//!
//! Data access layer for the orchestrator: the stack store.
//!
//! The [`StackStore`] trait is the only way services reach persisted stacks
//! and dependency edges. Two backends implement it:
//! - [`PgStackStore`]: PostgreSQL via sqlx
//! - [`InMemoryStackStore`]: process-local, for tests and `DATABASE_URL=memory`

pub mod dependency;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod stack;

// Re-export for convenience
pub use dependency as dependency_repository;
pub use error::{Result, StoreError};
pub use memory::InMemoryStackStore;
pub use postgres::PgStackStore;
pub use stack as stack_repository;

use async_trait::async_trait;
use keel_core::domain::stack::{Stack, StackDependency};
use keel_core::dto::dependency::CreateStackDependency;
use keel_core::dto::stack::CreateStack;
use uuid::Uuid;

/// Persistence contract for stacks and their dependency edges
#[async_trait]
pub trait StackStore: Send + Sync {
    async fn find_stack(&self, id: Uuid) -> Result<Option<Stack>>;

    async fn create_stack(&self, req: CreateStack) -> Result<Stack>;

    /// Persist every field of `stack` and bump `updated_at`
    ///
    /// Fails with `StackNotFound` if the id is absent.
    async fn update_stack(&self, stack: &Stack) -> Result<Stack>;

    /// Delete a stack and every edge touching it
    ///
    /// Fails with `StackNotFound` if the id is absent.
    async fn delete_stack(&self, id: Uuid) -> Result<()>;

    /// All stacks, oldest first
    async fn list_stacks(&self) -> Result<Vec<Stack>>;

    async fn find_dependency(&self, id: Uuid) -> Result<Option<StackDependency>>;

    /// Persist a new edge
    ///
    /// Fails with `MissingStack` if either endpoint does not exist.
    async fn create_dependency(&self, req: CreateStackDependency) -> Result<StackDependency>;

    async fn update_dependency(&self, edge: &StackDependency) -> Result<StackDependency>;

    async fn delete_dependency(&self, id: Uuid) -> Result<()>;

    /// Edges matching the filter, oldest first
    async fn list_dependencies(&self, filter: DependencyFilter) -> Result<Vec<StackDependency>>;
}

/// Predicate over edge endpoints; `None` matches anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyFilter {
    pub stack_id: Option<Uuid>,
    pub depends_on_stack_id: Option<Uuid>,
}

impl DependencyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Outgoing edges: what `stack_id` depends on
    pub fn dependencies_of(stack_id: Uuid) -> Self {
        Self {
            stack_id: Some(stack_id),
            depends_on_stack_id: None,
        }
    }

    /// Incoming edges: what depends on `stack_id`
    pub fn dependents_of(stack_id: Uuid) -> Self {
        Self {
            stack_id: None,
            depends_on_stack_id: Some(stack_id),
        }
    }

    pub fn matches(&self, edge: &StackDependency) -> bool {
        self.stack_id.is_none_or(|id| id == edge.stack_id)
            && self
                .depends_on_stack_id
                .is_none_or(|id| id == edge.depends_on_stack_id)
    }
}
