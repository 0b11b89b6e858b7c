//! Stack domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, independently deployable compose manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub id: Uuid,
    pub name: String,
    /// Compose manifest text. Opaque to everything except the manifest runner.
    pub code: String,
    /// Working directory the manifest is materialized from.
    pub cwd: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directed edge `stack_id -> depends_on_stack_id`.
///
/// `stack_id` is the dependent, `depends_on_stack_id` the stack it requires.
/// The edge set is kept acyclic and never holds a self edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDependency {
    pub id: Uuid,
    pub stack_id: Uuid,
    pub depends_on_stack_id: Uuid,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl StackDependency {
    /// Whether this edge touches the given stack at either end
    pub fn touches(&self, stack_id: Uuid) -> bool {
        self.stack_id == stack_id || self.depends_on_stack_id == stack_id
    }
}
