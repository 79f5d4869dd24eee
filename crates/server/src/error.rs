use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{DbErr, models::do_task::DoTaskError};
use thiserror::Error;
use utils::response::ApiResponse;
use workflow::{ActionParseError, WorkflowError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    DoTask(#[from] DoTaskError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    ActionParse(#[from] ActionParseError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<&'static str> for ApiError {
    fn from(msg: &'static str) -> Self {
        ApiError::BadRequest(msg.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::DoTask(err) => match err {
                DoTaskError::TaskNotFound => (StatusCode::NOT_FOUND, "DoTaskError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DoTaskError"),
            },
            ApiError::Workflow(err) => match err {
                WorkflowError::TaskNotFound => (StatusCode::NOT_FOUND, "WorkflowError"),
                // Guard failures are business outcomes, not protocol errors;
                // handlers normally report them inline, and this mapping keeps
                // the contract for any that slip through.
                WorkflowError::InvalidTransition { .. } => (StatusCode::OK, "WorkflowError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "WorkflowError"),
            },
            ApiError::ActionParse(_) => (StatusCode::BAD_REQUEST, "ActionParseError"),
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
        };

        let error_message = match &self {
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::NotFound(msg) | ApiError::Internal(msg) | ApiError::BadRequest(msg) => {
                msg.clone()
            }
            ApiError::Workflow(err) => err.to_string(),
            ApiError::ActionParse(err) => err.to_string(),
            ApiError::DoTask(DoTaskError::TaskNotFound) => "DO task not found".to_string(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
