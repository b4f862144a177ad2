//! Authentication Middleware
//! Mission: Verify inline Basic credentials on every protected request

use crate::accounts::{SharedAccountStore, StoreError};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;
use tracing::{error, warn};

/// Identity verified by the gateway for the current request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    id: String,
}

impl AuthenticatedAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Credentials decoded from an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub id: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse `Basic base64(id:password)`.
///
/// The decoded payload is split at the first colon; ids never contain one.
pub fn parse_basic_credentials(header: &str) -> Result<BasicCredentials, AuthError> {
    let mut parts = header.split(' ');
    let encoded = match (parts.next(), parts.next(), parts.next()) {
        (Some("Basic"), Some(encoded), None) => encoded,
        _ => return Err(AuthError::InvalidFormat),
    };

    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| AuthError::InvalidEncoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidEncoding)?;

    let (id, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MissingSeparator)?;

    Ok(BasicCredentials {
        id: id.to_string(),
        password: password.to_string(),
    })
}

/// Gate for protected routes.
///
/// Re-verifies credentials against the store on every call and binds the
/// verified id into the request extensions (and the response's, for
/// logging). Nothing is cached.
pub async fn basic_auth_middleware(
    State(store): State<SharedAccountStore>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let credentials = parse_basic_credentials(header).map_err(|e| {
        warn!(reason = ?e, "Malformed authorization header");
        e
    })?;

    match store
        .authenticate(&credentials.id, &credentials.password)
        .await
    {
        Ok(()) => {}
        Err(StoreError::NotFound | StoreError::CredentialMismatch) => {
            warn!(user_id = %credentials.id, "Authentication rejected");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            error!(user_id = %credentials.id, error = %e, "Authentication backend failure");
            return Err(AuthError::Unavailable);
        }
    }

    let account = AuthenticatedAccount::new(credentials.id);
    req.extensions_mut().insert(account.clone());

    let mut response = next.run(req).await;
    // Lets the outer request log attribute the call
    response.extensions_mut().insert(account);
    Ok(response)
}

/// Auth error types. Externally they are indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingCredentials,
    InvalidFormat,
    InvalidEncoding,
    MissingSeparator,
    InvalidCredentials,
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Authentication Failed" })),
        )
            .into_response()
    }
}
