//! Account Module
//! Mission: Storage-agnostic account repository with two interchangeable backends

pub mod memory;
pub mod models;
pub mod service;
pub mod sqlite;
pub mod validation;

#[cfg(test)]
mod contract_tests;

pub use memory::MemoryAccountStore;
pub use models::{Account, PatchAccountRequest, ProfilePatch, SignupRequest};
pub use service::{AccountService, ServiceError};
pub use sqlite::SqliteAccountStore;

use crate::auth::password::{HashError, PasswordHasher};
use async_trait::async_trait;
use std::sync::Arc;

/// Store handle shared by the gateway and the façade.
pub type SharedAccountStore = Arc<dyn AccountStore>;

/// Account store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account already exists")]
    AlreadyExists,
    #[error("account not found")]
    NotFound,
    #[error("credential mismatch")]
    CredentialMismatch,
    #[error(transparent)]
    Hashing(#[from] HashError),
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("operation abandoned by its caller")]
    Cancelled,
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Account repository contract.
///
/// Both backends honour the same guarantees: `register` is an atomic
/// create-if-absent, `patch_fields` never touches the credential hash or
/// fields absent from the patch, and `remove` succeeds whether or not the
/// account exists.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the account, or fail with `AlreadyExists`.
    async fn register(&self, id: &str, password: &str) -> Result<Account, StoreError>;

    /// `NotFound` and `CredentialMismatch` cost about the same to produce.
    async fn authenticate(&self, id: &str, password: &str) -> Result<(), StoreError>;

    async fn fetch(&self, id: &str) -> Result<Account, StoreError>;

    async fn patch_fields(&self, id: &str, patch: &ProfilePatch) -> Result<Account, StoreError>;

    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}

/// Check `password` against a stored hash, burning a decoy verification
/// when the account does not exist.
pub(crate) fn verify_credential(
    hasher: &PasswordHasher,
    password: &str,
    stored_hash: Option<&str>,
) -> Result<(), StoreError> {
    match stored_hash {
        Some(hash) if hasher.verify(password, hash) => Ok(()),
        Some(_) => Err(StoreError::CredentialMismatch),
        None => {
            hasher.verify_decoy(password);
            Err(StoreError::NotFound)
        }
    }
}
