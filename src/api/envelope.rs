//! The `{success, data | error}` wrapper every endpoint responds with.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Pagination;

/// Successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination: Some(pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failed response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Errors surfaced at the HTTP boundary.
///
/// Store failures carry a stable per-operation label that becomes the
/// `error` field; the underlying cause goes into `message` and the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Exercise not found")]
    ExerciseNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("{label}")]
    Internal {
        label: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(label: &'static str, cause: anyhow::Error) -> Self {
        Self::Internal { label, cause }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ExerciseNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal { label, cause } => {
                tracing::error!("{}: {:#}", label, cause);
                Some(cause.to_string())
            }
            other => {
                tracing::debug!("{}", other);
                None
            }
        };

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
