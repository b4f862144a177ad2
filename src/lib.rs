//! Account Service Library
//!
//! Account registration, Basic-auth verification and profile management
//! over a swappable account store (SQLite or in-memory).
//! Exposes every module so the binary and integration tests share one path.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;

pub use accounts::{AccountStore, SharedAccountStore, StoreError};
pub use api::create_router;
pub use config::Config;
