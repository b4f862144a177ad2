//! Request logging middleware.
//!
//! One line per request with method, path, status, latency and the
//! account the gateway verified, if any. Headers and bodies are never
//! logged; they carry credentials.

use crate::auth::AuthenticatedAccount;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Path skipped to keep health probes out of the log
const HEALTH_PATH: &str = "/ping";

/// Logged in place of an account id on unauthenticated routes
const ANONYMOUS: &str = "-";

/// Outermost layer: logs at INFO, or WARN for 5xx.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    if request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status();
    let caller = response
        .extensions()
        .get::<AuthenticatedAccount>()
        .map(AuthenticatedAccount::id)
        .unwrap_or(ANONYMOUS);

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), caller, latency_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), caller, latency_ms, "Request completed");
    }

    response
}
