//! Stack Dependency API Handlers

use axum::{Json, extract::State, http::StatusCode};
use keel_core::dto::dependency::{
    CreateStackDependency, StackDependencyBody, StackDependencyListBody, UpdateStackDependency,
};
use keel_core::dto::response::DataResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::repository::DependencyFilter;
use crate::service::dependency_service;
use crate::state::AppState;

/// POST /api/v1/stack_dependency
pub async fn create_stack_dependency(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateStackDependency>,
) -> ApiResult<(StatusCode, Json<DataResponse<StackDependencyBody>>)> {
    tracing::info!(
        "Adding dependency: {} -> {}",
        req.stack_id,
        req.depends_on_stack_id
    );

    let stack_dependency = dependency_service::add_stack_dependency(&state, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::created(StackDependencyBody { stack_dependency })),
    ))
}

/// Optional endpoint filters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub stack_id: Option<Uuid>,
    #[serde(alias = "dependent_stack_id")]
    pub depends_on_stack_id: Option<Uuid>,
}

/// GET /api/v1/stack_dependency?stack_id=&depends_on_stack_id=
pub async fn list_stack_dependencies(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<DataResponse<StackDependencyListBody>>> {
    tracing::debug!("Listing stack dependencies: {:?}", params);

    let filter = DependencyFilter {
        stack_id: params.stack_id,
        depends_on_stack_id: params.depends_on_stack_id,
    };
    let stack_dependencies = dependency_service::list_stack_dependencies(&state, filter).await?;

    Ok(Json(DataResponse::ok(StackDependencyListBody {
        stack_dependencies,
    })))
}

/// GET /api/v1/stack_dependency/{id}
pub async fn get_stack_dependency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<StackDependencyBody>>> {
    let stack_dependency = dependency_service::get_stack_dependency(&state, id).await?;

    Ok(Json(DataResponse::ok(StackDependencyBody { stack_dependency })))
}

/// PATCH /api/v1/stack_dependency/{id}
pub async fn update_stack_dependency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateStackDependency>,
) -> ApiResult<Json<DataResponse<StackDependencyBody>>> {
    tracing::info!("Updating stack dependency: {}", id);

    let stack_dependency = dependency_service::update_stack_dependency(&state, id, patch).await?;

    Ok(Json(DataResponse::ok(StackDependencyBody { stack_dependency })))
}

/// DELETE /api/v1/stack_dependency/{id}
pub async fn delete_stack_dependency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting stack dependency: {}", id);

    dependency_service::delete_stack_dependency(&state, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
