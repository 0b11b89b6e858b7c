//! Dependency Graph Engine
//!
//! Builds dependency and dependent trees from the stored edge set and
//! rejects edges that would introduce a self loop, a cycle, or a duplicate.
//!
//! Cycle detection is closure membership: the stored graph is acyclic going
//! in, so `a -> b` closes a cycle exactly when `a` is already reachable from
//! `b`. Every walk reads the store one node at a time and nothing is cached.

use keel_core::domain::stack::StackDependency;
use keel_core::domain::tree::{DependencyTree, DependentTree};
use uuid::Uuid;

use super::BoxFuture;
use super::error::{Result, StackError};
use crate::repository::{DependencyFilter, StackStore};

/// Everything `stack_id` depends on, transitively.
///
/// # Errors
/// `StackNotFound` if the root stack does not exist.
pub async fn compute_dependency_tree(
    store: &dyn StackStore,
    stack_id: Uuid,
) -> Result<DependencyTree> {
    ensure_stack(store, stack_id).await?;
    dependency_subtree(store, stack_id, None).await
}

/// Everything that depends on `stack_id`, transitively.
///
/// # Errors
/// `StackNotFound` if the root stack does not exist.
pub async fn compute_dependent_tree(
    store: &dyn StackStore,
    stack_id: Uuid,
) -> Result<DependentTree> {
    ensure_stack(store, stack_id).await?;
    dependent_subtree(store, stack_id).await
}

/// Check that `stack_id -> depends_on_stack_id` may be added.
pub async fn validate_new_edge(
    store: &dyn StackStore,
    stack_id: Uuid,
    depends_on_stack_id: Uuid,
) -> Result<()> {
    check_edge(store, stack_id, depends_on_stack_id, None).await
}

/// Check that `existing` may be moved to new endpoints.
///
/// The edge being mutated is left out of the graph while checking, so
/// moving an edge never collides with itself.
pub async fn validate_edge_mutation(
    store: &dyn StackStore,
    existing: &StackDependency,
    new_stack_id: Uuid,
    new_depends_on_stack_id: Uuid,
) -> Result<()> {
    if existing.stack_id == new_stack_id && existing.depends_on_stack_id == new_depends_on_stack_id
    {
        return Ok(());
    }

    check_edge(store, new_stack_id, new_depends_on_stack_id, Some(existing.id)).await
}

async fn check_edge(
    store: &dyn StackStore,
    stack_id: Uuid,
    depends_on_stack_id: Uuid,
    skip_edge: Option<Uuid>,
) -> Result<()> {
    if stack_id == depends_on_stack_id {
        return Err(StackError::SelfDependency { stack_id });
    }

    ensure_stack(store, stack_id).await?;
    ensure_stack(store, depends_on_stack_id).await?;

    let tree = dependency_subtree(store, depends_on_stack_id, skip_edge).await?;
    if tree.contains(stack_id) {
        tracing::warn!(
            "Rejected edge {} -> {}: cyclic dependency",
            stack_id,
            depends_on_stack_id
        );
        return Err(StackError::CycleDetected {
            stack_id,
            depends_on_stack_id,
        });
    }

    let duplicate = store
        .list_dependencies(DependencyFilter::dependencies_of(stack_id))
        .await?
        .iter()
        .any(|edge| Some(edge.id) != skip_edge && edge.depends_on_stack_id == depends_on_stack_id);
    if duplicate {
        return Err(StackError::DuplicateEdge {
            stack_id,
            depends_on_stack_id,
        });
    }

    Ok(())
}

async fn ensure_stack(store: &dyn StackStore, stack_id: Uuid) -> Result<()> {
    store
        .find_stack(stack_id)
        .await?
        .map(|_| ())
        .ok_or(StackError::StackNotFound(stack_id))
}

fn dependency_subtree<'a>(
    store: &'a dyn StackStore,
    stack_id: Uuid,
    skip_edge: Option<Uuid>,
) -> BoxFuture<'a, Result<DependencyTree>> {
    Box::pin(async move {
        let mut tree = DependencyTree::leaf(stack_id);

        let edges = store
            .list_dependencies(DependencyFilter::dependencies_of(stack_id))
            .await?;
        for edge in edges {
            if Some(edge.id) == skip_edge {
                continue;
            }
            let subtree = dependency_subtree(store, edge.depends_on_stack_id, skip_edge).await?;
            tree.push(subtree);
        }

        Ok(tree)
    })
}

fn dependent_subtree<'a>(
    store: &'a dyn StackStore,
    stack_id: Uuid,
) -> BoxFuture<'a, Result<DependentTree>> {
    Box::pin(async move {
        let mut tree = DependentTree::leaf(stack_id);

        let edges = store
            .list_dependencies(DependencyFilter::dependents_of(stack_id))
            .await?;
        for edge in edges {
            let subtree = dependent_subtree(store, edge.stack_id).await?;
            tree.push(subtree);
        }

        Ok(tree)
    })
}
