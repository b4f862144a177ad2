//! Authentication Module
//! Mission: Salted credential hashing and per-request Basic auth verification

pub mod middleware;
pub mod password;

pub use middleware::{basic_auth_middleware, AuthenticatedAccount, AuthError};
pub use password::{HashError, PasswordHasher};
