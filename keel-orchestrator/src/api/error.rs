//! API Error Handling
//!
//! Unified error type and conversion for API responses. Every error body is
//! an [`ErrorResponse`] carrying a machine-readable code.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keel_core::dto::response::{ErrorDetail, ErrorResponse};

use crate::service::StackError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest {
        code: &'static str,
        message: String,
        detail: String,
    },
    Unauthorized,
    /// The container runtime failed underneath us
    BadGateway { code: &'static str, message: String },
    InternalError(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::BadRequest {
            code: "invalid_request",
            detail: message.clone(),
            message,
        }
    }

    fn parts(self) -> (StatusCode, String, ErrorDetail) {
        match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                msg.clone(),
                detail("not_found", msg),
            ),
            ApiError::BadRequest {
                code,
                message,
                detail: text,
            } => (StatusCode::BAD_REQUEST, message, detail(code, text)),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                detail("unauthorized", "Missing or invalid x-api-key header"),
            ),
            ApiError::BadGateway { code, message } => {
                tracing::error!("Runtime error: {}", message);
                (StatusCode::BAD_GATEWAY, message.clone(), detail(code, message))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    detail("internal_error", "Internal server error"),
                )
            }
        }
    }
}

fn detail(code: &str, message: impl Into<String>) -> ErrorDetail {
    ErrorDetail {
        code: code.to_string(),
        message: message.into(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = self.parts();

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
            errors: vec![error],
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<StackError> for ApiError {
    fn from(err: StackError) -> Self {
        let message = err.to_string();
        if !err.is_validation() {
            tracing::warn!("Request failed: {}", message);
        }

        match err {
            StackError::StackNotFound(_) | StackError::DependencyNotFound(_) => {
                ApiError::NotFound(message)
            }
            StackError::SelfDependency { .. } => ApiError::BadRequest {
                code: "self_dependency",
                message,
                detail: "Stack cannot depend on itself".to_string(),
            },
            StackError::CycleDetected { .. } => ApiError::BadRequest {
                code: "cyclic_dependency",
                message,
                detail: "Cyclic dependency between dependent stack and owner stack".to_string(),
            },
            StackError::DuplicateEdge { .. } => ApiError::BadRequest {
                code: "duplicate_dependency",
                message,
                detail: "Dependency between these stacks already exists".to_string(),
            },
            StackError::InvalidRequest(_) => ApiError::bad_request(message),
            StackError::DeployFailed { .. } => ApiError::BadGateway {
                code: "deploy_failed",
                message,
            },
            StackError::TeardownFailed { .. } => ApiError::BadGateway {
                code: "teardown_failed",
                message,
            },
            StackError::Runner(_) => ApiError::BadGateway {
                code: "runner_error",
                message,
            },
            StackError::Store(_) => ApiError::InternalError(message),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StoreError;
    use uuid::Uuid;

    fn status_of(err: StackError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();

        assert_eq!(status_of(StackError::StackNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(StackError::DependencyNotFound(id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StackError::SelfDependency { stack_id: id }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StackError::CycleDetected {
                stack_id: id,
                depends_on_stack_id: id,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StackError::InvalidRequest("nope".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StackError::DeployFailed {
                stack_id: id,
                reason: "unhealthy".to_string(),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(StackError::Store(StoreError::Database(sqlx::Error::PoolTimedOut))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cycle_error_code() {
        let err = ApiError::from(StackError::CycleDetected {
            stack_id: Uuid::new_v4(),
            depends_on_stack_id: Uuid::new_v4(),
        });

        let ApiError::BadRequest { code, message, detail } = err else {
            panic!("expected bad request");
        };
        assert_eq!(code, "cyclic_dependency");
        assert!(message.ends_with("cyclic dependency detected"));
        assert_eq!(
            detail,
            "Cyclic dependency between dependent stack and owner stack"
        );
    }
}
