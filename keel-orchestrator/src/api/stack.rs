//! Stack API Handlers
//!
//! HTTP endpoints for stack management and orchestration.

use axum::{Json, extract::State, http::StatusCode};
use keel_core::dto::deploy::{DeployOutcome, StatusBody, TeardownAllBody, TeardownOutcome};
use keel_core::dto::dependency::{DependencyTreeBody, DependentTreeBody};
use keel_core::dto::response::DataResponse;
use keel_core::dto::stack::{CreateStack, StackBody, StackListBody, UpdateStack};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::service::{dependency_service, orchestrator_service, stack_service};
use crate::state::AppState;

// =============================================================================
// CRUD Endpoints
// =============================================================================

/// POST /api/v1/stack
pub async fn create_stack(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateStack>,
) -> ApiResult<(StatusCode, Json<DataResponse<StackBody>>)> {
    tracing::info!("Creating stack: {}", req.name);

    let stack = stack_service::create_stack(&state, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::created(StackBody { stack })),
    ))
}

/// GET /api/v1/stack
pub async fn list_stacks(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<StackListBody>>> {
    tracing::debug!("Listing all stacks");

    let stacks = stack_service::list_stacks(&state).await?;

    Ok(Json(DataResponse::ok(StackListBody { stacks })))
}

/// GET /api/v1/stack/{stack_id}
pub async fn get_stack(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<StackBody>>> {
    tracing::debug!("Getting stack: {}", stack_id);

    let stack = stack_service::get_stack(&state, stack_id).await?;

    Ok(Json(DataResponse::ok(StackBody { stack })))
}

/// PATCH /api/v1/stack/{stack_id}
pub async fn update_stack(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateStack>,
) -> ApiResult<Json<DataResponse<StackBody>>> {
    tracing::info!("Updating stack: {}", stack_id);

    let stack = stack_service::update_stack(&state, stack_id, patch).await?;

    Ok(Json(DataResponse::ok(StackBody { stack })))
}

/// DELETE /api/v1/stack/{stack_id}
pub async fn delete_stack(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting stack: {}", stack_id);

    stack_service::delete_stack(&state, stack_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orchestration Endpoints
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct DeployParams {
    pub deploy_dependents: Option<bool>,
}

/// POST /api/v1/stack/{stack_id}/deploy?deploy_dependents=true
pub async fn deploy_stack(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<DeployParams>,
) -> ApiResult<Json<DataResponse<DeployOutcome>>> {
    let redeploy = params.deploy_dependents.unwrap_or(true);
    tracing::info!("Deploying stack: {} (redeploy dependents: {})", stack_id, redeploy);

    let outcome = orchestrator_service::deploy_stack(&state, stack_id, redeploy).await?;

    Ok(Json(DataResponse::ok(outcome)))
}

/// POST /api/v1/stack/{stack_id}/teardown
///
/// Any failure in the cascade fails the request.
pub async fn teardown_stack(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<TeardownOutcome>>> {
    tracing::info!("Tearing down stack: {}", stack_id);

    let outcome = orchestrator_service::teardown_stack(&state, stack_id).await?;
    let outcome = orchestrator_service::surface_failure(outcome)?;

    Ok(Json(DataResponse::ok(outcome)))
}

/// POST /api/v1/stack/teardown
///
/// Per-stack failures are reported in the body, not as an error status.
pub async fn teardown_all_stacks(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<TeardownAllBody>>> {
    tracing::info!("Tearing down all stacks");

    let outcomes = orchestrator_service::teardown_all_stacks(&state).await?;

    Ok(Json(DataResponse::ok(TeardownAllBody { outcomes })))
}

/// GET /api/v1/stack/{stack_id}/status
pub async fn get_stack_status(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<StatusBody>>> {
    tracing::debug!("Getting status of stack: {}", stack_id);

    let status = orchestrator_service::get_stack_status(&state, stack_id).await?;

    Ok(Json(DataResponse::ok(StatusBody { status })))
}

// =============================================================================
// Graph Endpoints
// =============================================================================

/// GET /api/v1/stack/{stack_id}/dependencies
pub async fn get_dependency_tree(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<DependencyTreeBody>>> {
    let tree = dependency_service::dependency_tree(&state, stack_id).await?;

    Ok(Json(DataResponse::ok(DependencyTreeBody { tree })))
}

/// GET /api/v1/stack/{stack_id}/dependents
pub async fn get_dependent_tree(
    State(state): State<AppState>,
    ApiPath(stack_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<DependentTreeBody>>> {
    let tree = dependency_service::dependent_tree(&state, stack_id).await?;

    Ok(Json(DataResponse::ok(DependentTreeBody { tree })))
}
