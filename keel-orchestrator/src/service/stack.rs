//! Stack Service
//!
//! Business logic for stack management.

use keel_core::domain::stack::Stack;
use keel_core::dto::stack::{CreateStack, UpdateStack};
use uuid::Uuid;

use super::error::{Result, StackError};
use crate::state::AppState;

const MAX_NAME_LEN: usize = 255;

/// Create a new stack after validating its name and manifest
pub async fn create_stack(state: &AppState, req: CreateStack) -> Result<Stack> {
    validate_name(&req.name)?;
    state
        .runner
        .validate_manifest(&req.code, req.cwd.as_deref())
        .await?;

    let stack = state.store.create_stack(req).await?;

    tracing::info!("Stack created: {} ({})", stack.name, stack.id);

    Ok(stack)
}

/// Get a stack by ID
pub async fn get_stack(state: &AppState, id: Uuid) -> Result<Stack> {
    state
        .store
        .find_stack(id)
        .await?
        .ok_or(StackError::StackNotFound(id))
}

/// List all stacks, oldest first
pub async fn list_stacks(state: &AppState) -> Result<Vec<Stack>> {
    Ok(state.store.list_stacks().await?)
}

/// Apply a partial update to a stack
///
/// The manifest is validated again whenever the code or working directory
/// changes. Running containers are not touched.
pub async fn update_stack(state: &AppState, id: Uuid, patch: UpdateStack) -> Result<Stack> {
    let mut stack = get_stack(state, id).await?;

    if patch.is_empty() {
        return Ok(stack);
    }

    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    let manifest_changed = patch.code.is_some() || patch.cwd.is_some();

    patch.apply_to(&mut stack);

    if manifest_changed {
        state
            .runner
            .validate_manifest(&stack.code, stack.cwd.as_deref())
            .await?;
    }

    let stack = state.store.update_stack(&stack).await?;

    tracing::info!("Stack updated: {} ({})", stack.name, stack.id);

    Ok(stack)
}

/// Delete a stack and its edges; containers are left as they are
pub async fn delete_stack(state: &AppState, id: Uuid) -> Result<()> {
    state.store.delete_stack(id).await?;

    tracing::info!("Stack deleted: {}", id);

    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StackError::InvalidRequest(
            "Stack name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(StackError::InvalidRequest(format!(
            "Stack name cannot be longer than {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{create_req, test_state};

    #[tokio::test]
    async fn test_create_and_get() {
        let (state, _runner) = test_state();

        let stack = create_stack(&state, create_req("web")).await.unwrap();
        let found = get_stack(&state, stack.id).await.unwrap();
        assert_eq!(found, stack);
        assert_eq!(list_stacks(&state).await.unwrap(), vec![stack]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_name() {
        let (state, _runner) = test_state();

        let result = create_stack(&state, create_req("   ")).await;
        assert!(matches!(result, Err(StackError::InvalidRequest(_))));

        let long = "x".repeat(MAX_NAME_LEN + 1);
        let result = create_stack(&state, create_req(&long)).await;
        assert!(matches!(result, Err(StackError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_manifest() {
        let (state, _runner) = test_state();
        let mut req = create_req("web");
        req.code = "services: {}".to_string();

        let result = create_stack(&state, req).await;
        assert!(matches!(result, Err(StackError::InvalidRequest(_))));
        assert!(list_stacks(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let (state, _runner) = test_state();
        let stack = create_stack(&state, create_req("web")).await.unwrap();

        let patch = UpdateStack {
            notes: Some("frontend".to_string()),
            ..Default::default()
        };
        let updated = update_stack(&state, stack.id, patch).await.unwrap();
        assert_eq!(updated.notes, "frontend");
        assert_eq!(updated.name, "web");
        assert_eq!(updated.code, stack.code);

        let patch = UpdateStack {
            code: Some("not: [a, manifest".to_string()),
            ..Default::default()
        };
        let result = update_stack(&state, stack.id, patch).await;
        assert!(matches!(result, Err(StackError::InvalidRequest(_))));
        assert_eq!(get_stack(&state, stack.id).await.unwrap().code, stack.code);
    }

    #[tokio::test]
    async fn test_delete() {
        let (state, _runner) = test_state();
        let stack = create_stack(&state, create_req("web")).await.unwrap();

        delete_stack(&state, stack.id).await.unwrap();
        assert!(matches!(
            get_stack(&state, stack.id).await,
            Err(StackError::StackNotFound(_))
        ));
        assert!(matches!(
            delete_stack(&state, stack.id).await,
            Err(StackError::StackNotFound(_))
        ));
        assert!(matches!(
            delete_stack(&state, Uuid::new_v4()).await,
            Err(StackError::StackNotFound(_))
        ));
    }
}
