//! Stack dependency DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::stack::StackDependency;
use crate::domain::tree::{DependencyTree, DependentTree};

/// Request to add an edge `stack_id -> depends_on_stack_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStackDependency {
    pub stack_id: Uuid,
    #[serde(alias = "dependent_stack_id")]
    pub depends_on_stack_id: Uuid,
    #[serde(default)]
    pub notes: String,
}

/// Partial update of an edge; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStackDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<Uuid>,
    #[serde(
        default,
        alias = "dependent_stack_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub depends_on_stack_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateStackDependency {
    /// The edge as it would look after applying this patch
    pub fn applied_to(&self, edge: &StackDependency) -> StackDependency {
        StackDependency {
            stack_id: self.stack_id.unwrap_or(edge.stack_id),
            depends_on_stack_id: self.depends_on_stack_id.unwrap_or(edge.depends_on_stack_id),
            notes: self.notes.clone().unwrap_or_else(|| edge.notes.clone()),
            ..edge.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDependencyBody {
    pub stack_dependency: StackDependency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDependencyListBody {
    pub stack_dependencies: Vec<StackDependency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyTreeBody {
    pub tree: DependencyTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependentTreeBody {
    pub tree: DependentTree,
}
