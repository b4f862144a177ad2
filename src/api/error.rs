//! API error envelopes

use crate::accounts::{service::SIGNUP_FAILED, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Client-facing failures. Never carries backend detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest {
        message: &'static str,
        cause: &'static str,
    },
    Unauthorized,
    Forbidden,
    NotFound,
    Internal(&'static str),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation { message, cause } => ApiError::BadRequest { message, cause },
            ServiceError::AlreadyExists => ApiError::BadRequest {
                message: SIGNUP_FAILED,
                cause: "already same user_id is used",
            },
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::Unauthorized => ApiError::Unauthorized,
            ServiceError::Forbidden => ApiError::Forbidden,
            ServiceError::Storage { .. } => ApiError::Internal("something went wrong"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest { message, cause } => (
                StatusCode::BAD_REQUEST,
                json!({ "message": message, "cause": cause }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Authentication Failed" }),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "message": "No Permission for Update" }),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "message": "No User Found" })),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
