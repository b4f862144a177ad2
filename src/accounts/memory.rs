//! In-Memory Account Store
//! Mission: Lock-guarded account map for development and tests (no durability)

use crate::accounts::{verify_credential, Account, AccountStore, ProfilePatch, StoreError};
use crate::auth::password::PasswordHasher;
use async_trait::async_trait;
use parking_lot::RwLock; // Faster than tokio RwLock for short critical sections
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

struct StoredAccount {
    password_hash: String,
    account: Account,
}

/// Account store backed by a single reader/writer-locked map.
///
/// Writers (`register`, `patch_fields`, `remove`) take the exclusive lock,
/// readers (`authenticate`, `fetch`) the shared one. The lock is never held
/// across an await or while bcrypt runs.
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, StoredAccount>>,
    hasher: Arc<PasswordHasher>,
}

impl MemoryAccountStore {
    pub fn new(hasher: Arc<PasswordHasher>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn register(&self, id: &str, password: &str) -> Result<Account, StoreError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        // A caller that goes away while hashing never reaches the insert
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        // Check and insert under one exclusive acquisition
        let mut accounts = self.accounts.write();
        match accounts.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let account = Account::new(id);
                slot.insert(StoredAccount {
                    password_hash,
                    account: account.clone(),
                });
                info!(user_id = %id, "Account registered (memory)");
                Ok(account)
            }
        }
    }

    async fn authenticate(&self, id: &str, password: &str) -> Result<(), StoreError> {
        let stored_hash = self
            .accounts
            .read()
            .get(id)
            .map(|stored| stored.password_hash.clone());

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            verify_credential(&hasher, &password, stored_hash.as_deref())
        })
        .await?
    }

    async fn fetch(&self, id: &str) -> Result<Account, StoreError> {
        self.accounts
            .read()
            .get(id)
            .map(|stored| stored.account.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn patch_fields(&self, id: &str, patch: &ProfilePatch) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();
        let stored = accounts.get_mut(id).ok_or(StoreError::NotFound)?;
        patch.apply(&mut stored.account);
        Ok(stored.account.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if self.accounts.write().remove(id).is_some() {
            debug!(user_id = %id, "Account removed (memory)");
        }
        Ok(())
    }
}
