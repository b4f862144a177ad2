//! Account Operations
//! Mission: Validate request shape, enforce ownership, then delegate to the store

use crate::accounts::{
    validation, Account, PatchAccountRequest, ProfilePatch, SharedAccountStore, SignupRequest,
    StoreError,
};
use crate::auth::middleware::AuthenticatedAccount;
use tracing::{error, info, warn};

pub const SIGNUP_FAILED: &str = "Account creation failed";
pub const UPDATE_FAILED: &str = "User updation failed";

/// Façade errors, one per client-facing outcome
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}: {cause}")]
    Validation {
        message: &'static str,
        cause: &'static str,
    },
    #[error("account already exists")]
    AlreadyExists,
    #[error("account not found")]
    NotFound,
    #[error("credentials rejected")]
    Unauthorized,
    #[error("caller does not own the target account")]
    Forbidden,
    #[error("storage failure during {operation}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    fn signup(cause: &'static str) -> Self {
        ServiceError::Validation {
            message: SIGNUP_FAILED,
            cause,
        }
    }

    fn update(cause: &'static str) -> Self {
        ServiceError::Validation {
            message: UPDATE_FAILED,
            cause,
        }
    }

    /// Translate a store error, logging anything that is not a domain outcome
    fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => ServiceError::AlreadyExists,
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::CredentialMismatch => ServiceError::Unauthorized,
            source => {
                error!(operation, error = %source, "Account storage failure");
                ServiceError::Storage { operation, source }
            }
        }
    }
}

/// The four account use-cases. Depends only on the store contract.
#[derive(Clone)]
pub struct AccountService {
    store: SharedAccountStore,
}

impl AccountService {
    pub fn new(store: SharedAccountStore) -> Self {
        Self { store }
    }

    /// Register a new account; its nickname starts out as the id
    pub async fn register(&self, request: SignupRequest) -> Result<Account, ServiceError> {
        let user_id = request.user_id.unwrap_or_default();
        let password = request.password.unwrap_or_default();

        if user_id.is_empty() {
            return Err(ServiceError::signup("required user_id is missing"));
        }
        if password.is_empty() {
            return Err(ServiceError::signup("required password is missing"));
        }
        if !validation::is_valid_user_id(&user_id) {
            return Err(ServiceError::signup("invalid user_id pattern"));
        }
        if !validation::is_valid_password(&password) {
            return Err(ServiceError::signup("invalid password pattern"));
        }

        let account = self
            .store
            .register(&user_id, &password)
            .await
            .map_err(|e| ServiceError::from_store("register", e))?;

        info!(user_id = %account.id, "Signup completed");
        Ok(account)
    }

    /// Any authenticated caller may read any account's public profile.
    pub async fn fetch(&self, id: &str) -> Result<Account, ServiceError> {
        self.store
            .fetch(id)
            .await
            .map_err(|e| ServiceError::from_store("fetch", e))
    }

    /// Ownership is enforced here and nowhere else.
    pub fn ensure_owner(caller: &AuthenticatedAccount, target: &str) -> Result<(), ServiceError> {
        if caller.id() != target {
            warn!(caller = %caller.id(), target, "Rejected update of another account");
            return Err(ServiceError::Forbidden);
        }
        Ok(())
    }

    pub async fn patch(
        &self,
        caller: &AuthenticatedAccount,
        target: &str,
        request: PatchAccountRequest,
    ) -> Result<Account, ServiceError> {
        Self::ensure_owner(caller, target)?;

        if request.user_id.is_some() || request.password.is_some() {
            return Err(ServiceError::update("not updatable user_id and password"));
        }

        let patch = ProfilePatch {
            nickname: request.nickname,
            comment: request.comment,
        };
        if patch.is_empty() {
            return Err(ServiceError::update("required nickname or comment"));
        }
        if matches!(&patch.nickname, Some(n) if !validation::is_valid_nickname(n)) {
            return Err(ServiceError::update("invalid nickname pattern"));
        }
        if matches!(&patch.comment, Some(c) if !validation::is_valid_comment(c)) {
            return Err(ServiceError::update("invalid comment pattern"));
        }

        self.store
            .patch_fields(caller.id(), &patch)
            .await
            .map_err(|e| ServiceError::from_store("patch", e))
    }

    /// Always removes the caller's own account
    pub async fn remove(&self, caller: &AuthenticatedAccount) -> Result<(), ServiceError> {
        self.store
            .remove(caller.id())
            .await
            .map_err(|e| ServiceError::from_store("remove", e))?;

        info!(user_id = %caller.id(), "Account closed");
        Ok(())
    }
}
