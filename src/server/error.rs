//! HTTP error mapping for the trigger surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::core::PipelineError;
use crate::generator::GenerationError;

use super::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A run is already in flight.
    #[error("A task is already running")]
    Busy,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Run worker is not available")]
    WorkerUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Busy => ApiError::Busy,
            PipelineError::Generation(e) => ApiError::Generation(e),
            PipelineError::UnknownPlatform(e) => ApiError::BadRequest(e.to_string()),
            PipelineError::UnknownContentKind(e) => ApiError::BadRequest(e.to_string()),
            PipelineError::WorkerUnavailable => ApiError::WorkerUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Busy => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
