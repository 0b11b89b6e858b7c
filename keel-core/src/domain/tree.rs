//! Dependency and dependent trees
//!
//! Both trees are owned values built bottom-up in a single traversal of the
//! edge set. The flattened closure is computed once while building and is
//! never cached between calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Everything a stack requires, transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTree {
    pub stack_id: Uuid,
    /// One subtree per direct dependency edge
    pub dependencies: Vec<DependencyTree>,
    /// Transitive closure of dependency ids, root excluded
    pub all_dependencies: BTreeSet<Uuid>,
}

impl DependencyTree {
    pub fn leaf(stack_id: Uuid) -> Self {
        Self {
            stack_id,
            dependencies: Vec::new(),
            all_dependencies: BTreeSet::new(),
        }
    }

    /// Attach a direct dependency subtree, folding its closure into ours.
    pub fn push(&mut self, subtree: DependencyTree) {
        self.all_dependencies.insert(subtree.stack_id);
        self.all_dependencies
            .extend(subtree.all_dependencies.iter().copied());
        self.dependencies.push(subtree);
    }

    /// Ids of the direct dependencies, in edge order
    pub fn direct_ids(&self) -> Vec<Uuid> {
        self.dependencies.iter().map(|d| d.stack_id).collect()
    }

    pub fn contains(&self, stack_id: Uuid) -> bool {
        self.all_dependencies.contains(&stack_id)
    }
}

/// Everything that requires a stack, transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentTree {
    pub stack_id: Uuid,
    /// One subtree per direct dependent edge
    pub dependents: Vec<DependentTree>,
    /// Transitive closure of dependent ids, root excluded
    pub all_dependents: BTreeSet<Uuid>,
}

impl DependentTree {
    pub fn leaf(stack_id: Uuid) -> Self {
        Self {
            stack_id,
            dependents: Vec::new(),
            all_dependents: BTreeSet::new(),
        }
    }

    /// Attach a direct dependent subtree, folding its closure into ours.
    pub fn push(&mut self, subtree: DependentTree) {
        self.all_dependents.insert(subtree.stack_id);
        self.all_dependents
            .extend(subtree.all_dependents.iter().copied());
        self.dependents.push(subtree);
    }

    /// Ids of the direct dependents, in edge order
    pub fn direct_ids(&self) -> Vec<Uuid> {
        self.dependents.iter().map(|d| d.stack_id).collect()
    }

    pub fn contains(&self, stack_id: Uuid) -> bool {
        self.all_dependents.contains(&stack_id)
    }
}
