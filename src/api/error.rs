use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::error::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    BadRequest(String),

    #[error("coach is not configured")]
    CoachUnavailable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Engine(e) => ApiError::Engine(e),
            StoreError::Persist(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Engine(e) => match e {
                EngineError::UnknownLift(_)
                | EngineError::UnknownProgramDay { .. }
                | EngineError::RestDay { .. }
                | EngineError::DateOutsideProgram(_) => StatusCode::NOT_FOUND,
                EngineError::DuplicateWorkoutLog(_) | EngineError::StartDateNotSet => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CoachUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request.failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request.rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
