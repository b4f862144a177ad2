//! Account API Endpoints
//! Mission: Translate HTTP requests into account operations

use crate::accounts::{
    service::{SIGNUP_FAILED, UPDATE_FAILED},
    AccountService, PatchAccountRequest, ServiceError, SignupRequest,
};
use crate::api::{
    error::ApiError,
    models::{
        MessageResponse, PatchResponse, SignupResponse, SignupUser, UpdatedProfile,
        UserDetailsResponse,
    },
    AppState,
};
use crate::auth::AuthenticatedAccount;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Health check - GET /ping
pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse { message: "healthy" })
}

/// Signup - POST /signup
pub async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SignupResponse>, ApiError> {
    let request: SignupRequest = parse_body(&body).map_err(|e| {
        debug!(error = %e, "Unparseable signup body");
        ApiError::BadRequest {
            message: SIGNUP_FAILED,
            cause: "invalid request body",
        }
    })?;

    let account = state.accounts.register(request).await?;

    Ok(Json(SignupResponse {
        message: "Account successfully created",
        user: SignupUser {
            user_id: account.id,
            nickname: account.nickname,
        },
    }))
}

/// Public profile of any account - GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let account = state.accounts.fetch(&id).await?;

    Ok(Json(UserDetailsResponse {
        message: "User details by user_id",
        user: account.into(),
    }))
}

/// Update own profile - PATCH /users/:id
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<PatchResponse>, ApiError> {
    // Ownership is decided before the body is looked at
    AccountService::ensure_owner(&caller, &id)?;

    let request: PatchAccountRequest = parse_body(&body).map_err(|_| ApiError::BadRequest {
        message: UPDATE_FAILED,
        cause: "invalid",
    })?;

    let account = state.accounts.patch(&caller, &id, request).await?;

    Ok(Json(PatchResponse {
        message: "User successfully updated",
        recipe: vec![UpdatedProfile {
            nickname: account.nickname,
            comment: account.comment,
        }],
    }))
}

/// Close own account - POST /close
pub async fn close_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.remove(&caller).await.map_err(|e| match e {
        ServiceError::Storage { .. } => ApiError::Internal("db error"),
        other => other.into(),
    })?;

    Ok(Json(MessageResponse {
        message: "Account and user successfully removed",
    }))
}
