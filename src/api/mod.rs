//! HTTP surface for the account service

pub mod error;
pub mod handlers;
pub mod models;

pub use error::ApiError;

use crate::accounts::{AccountService, SharedAccountStore};
use crate::auth::basic_auth_middleware;
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
}

/// Create the API router around a single shared store handle.
///
/// `/ping` and `/signup` are public; every other route passes the Basic
/// auth gateway first. Each request is bounded by `request_timeout`.
pub fn create_router(store: SharedAccountStore, request_timeout: Duration) -> Router {
    let state = AppState {
        accounts: Arc::new(AccountService::new(store.clone())),
    };

    let protected_routes = Router::new()
        .route(
            "/users/:id",
            get(handlers::get_user).patch(handlers::patch_user),
        )
        .route("/close", post(handlers::close_account))
        .route_layer(middleware::from_fn_with_state(store, basic_auth_middleware))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/signup", post(handlers::signup))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(request_logging))
}
