//! Stack Dependency Service
//!
//! Every edge write goes through the graph engine first.

use keel_core::domain::stack::StackDependency;
use keel_core::domain::tree::{DependencyTree, DependentTree};
use keel_core::dto::dependency::{CreateStackDependency, UpdateStackDependency};
use uuid::Uuid;

use super::error::{Result, StackError};
use super::graph;
use crate::repository::DependencyFilter;
use crate::state::AppState;

/// Add an edge `stack_id -> depends_on_stack_id`
pub async fn add_stack_dependency(
    state: &AppState,
    req: CreateStackDependency,
) -> Result<StackDependency> {
    graph::validate_new_edge(state.store.as_ref(), req.stack_id, req.depends_on_stack_id).await?;

    let edge = state.store.create_dependency(req).await?;

    tracing::info!(
        "Stack dependency created: {} ({} -> {})",
        edge.id,
        edge.stack_id,
        edge.depends_on_stack_id
    );

    Ok(edge)
}

/// Get an edge by ID
pub async fn get_stack_dependency(state: &AppState, id: Uuid) -> Result<StackDependency> {
    state
        .store
        .find_dependency(id)
        .await?
        .ok_or(StackError::DependencyNotFound(id))
}

/// List edges matching the filter, oldest first
pub async fn list_stack_dependencies(
    state: &AppState,
    filter: DependencyFilter,
) -> Result<Vec<StackDependency>> {
    Ok(state.store.list_dependencies(filter).await?)
}

/// Apply a partial update to an edge, re-validating moved endpoints
pub async fn update_stack_dependency(
    state: &AppState,
    id: Uuid,
    patch: UpdateStackDependency,
) -> Result<StackDependency> {
    let existing = get_stack_dependency(state, id).await?;
    let updated = patch.applied_to(&existing);

    graph::validate_edge_mutation(
        state.store.as_ref(),
        &existing,
        updated.stack_id,
        updated.depends_on_stack_id,
    )
    .await?;

    let edge = state.store.update_dependency(&updated).await?;

    tracing::info!(
        "Stack dependency updated: {} ({} -> {})",
        edge.id,
        edge.stack_id,
        edge.depends_on_stack_id
    );

    Ok(edge)
}

/// Delete an edge
pub async fn delete_stack_dependency(state: &AppState, id: Uuid) -> Result<()> {
    state.store.delete_dependency(id).await?;

    tracing::info!("Stack dependency deleted: {}", id);

    Ok(())
}

/// Transitive dependencies of a stack
pub async fn dependency_tree(state: &AppState, stack_id: Uuid) -> Result<DependencyTree> {
    graph::compute_dependency_tree(state.store.as_ref(), stack_id).await
}

/// Transitive dependents of a stack
pub async fn dependent_tree(state: &AppState, stack_id: Uuid) -> Result<DependentTree> {
    graph::compute_dependent_tree(state.store.as_ref(), stack_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{create_stack_in, test_state};

    fn edge(stack_id: Uuid, depends_on_stack_id: Uuid) -> CreateStackDependency {
        CreateStackDependency {
            stack_id,
            depends_on_stack_id,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_and_reverse_is_cycle() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let b = create_stack_in(state.store.as_ref(), "b").await;

        let created = add_stack_dependency(&state, edge(b.id, a.id)).await.unwrap();
        assert_eq!(get_stack_dependency(&state, created.id).await.unwrap(), created);

        let err = add_stack_dependency(&state, edge(a.id, b.id))
            .await
            .unwrap_err();
        assert!(matches!(err, StackError::CycleDetected { .. }));
        assert!(err.to_string().contains(&a.id.to_string()));
        assert!(err.to_string().contains(&b.id.to_string()));

        let all = list_stack_dependencies(&state, DependencyFilter::all())
            .await
            .unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn test_add_self_dependency() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;

        assert!(matches!(
            add_stack_dependency(&state, edge(a.id, a.id)).await,
            Err(StackError::SelfDependency { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_with_missing_owner() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let ghost = Uuid::new_v4();

        assert!(matches!(
            add_stack_dependency(&state, edge(ghost, a.id)).await,
            Err(StackError::StackNotFound(id)) if id == ghost
        ));
    }

    #[tokio::test]
    async fn test_update_validates_new_endpoints() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let b = create_stack_in(state.store.as_ref(), "b").await;
        let c = create_stack_in(state.store.as_ref(), "c").await;

        add_stack_dependency(&state, edge(b.id, a.id)).await.unwrap();
        let moving = add_stack_dependency(&state, edge(c.id, b.id)).await.unwrap();

        // Only b -> a remains once c -> b is set aside
        let retarget = UpdateStackDependency {
            stack_id: Some(a.id),
            depends_on_stack_id: Some(c.id),
            ..Default::default()
        };
        let moved = update_stack_dependency(&state, moving.id, retarget)
            .await
            .unwrap();
        assert_eq!(moved.stack_id, a.id);
        assert_eq!(moved.depends_on_stack_id, c.id);

        let cyclic = UpdateStackDependency {
            depends_on_stack_id: Some(b.id),
            ..Default::default()
        };
        let err = update_stack_dependency(&state, moving.id, cyclic)
            .await
            .unwrap_err();
        assert!(matches!(err, StackError::CycleDetected { .. }));
    }

    #[tokio::test]
    async fn test_update_notes_only() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let b = create_stack_in(state.store.as_ref(), "b").await;
        let created = add_stack_dependency(&state, edge(b.id, a.id)).await.unwrap();

        let patch = UpdateStackDependency {
            notes: Some("needs the database".to_string()),
            ..Default::default()
        };
        let updated = update_stack_dependency(&state, created.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.notes, "needs the database");
        assert_eq!(updated.stack_id, b.id);
    }

    #[tokio::test]
    async fn test_delete_dependency() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let b = create_stack_in(state.store.as_ref(), "b").await;
        let created = add_stack_dependency(&state, edge(b.id, a.id)).await.unwrap();

        delete_stack_dependency(&state, created.id).await.unwrap();
        assert!(matches!(
            get_stack_dependency(&state, created.id).await,
            Err(StackError::DependencyNotFound(_))
        ));
        assert!(matches!(
            delete_stack_dependency(&state, created.id).await,
            Err(StackError::DependencyNotFound(_))
        ));

        // Reverse edge is allowed once the original is gone
        assert!(add_stack_dependency(&state, edge(a.id, b.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_trees_follow_edges() {
        let (state, _runner) = test_state();
        let a = create_stack_in(state.store.as_ref(), "a").await;
        let b = create_stack_in(state.store.as_ref(), "b").await;
        add_stack_dependency(&state, edge(b.id, a.id)).await.unwrap();

        assert!(dependency_tree(&state, b.id).await.unwrap().contains(a.id));
        assert!(dependent_tree(&state, a.id).await.unwrap().contains(b.id));
    }
}
