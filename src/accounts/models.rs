//! Account Models
//! Mission: Define the account record and the shapes that mutate it

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public view of an account. The credential hash stays inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub nickname: String,
    pub comment: String,
}

impl Account {
    /// Freshly registered account: nickname defaults to the id, empty comment.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            nickname: id.clone(),
            id,
            comment: String::new(),
        }
    }
}

/// Partial profile update. `None` leaves a field untouched, `Some("")`
/// resets it (nickname falls back to the id, comment is cleared).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub nickname: Option<String>,
    pub comment: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.comment.is_none()
    }

    /// Nickname value to persist, with the empty-resets-to-id rule applied.
    pub fn resolved_nickname(&self, id: &str) -> Option<String> {
        self.nickname.as_ref().map(|nickname| {
            if nickname.is_empty() {
                id.to_string()
            } else {
                nickname.clone()
            }
        })
    }

    pub fn apply(&self, account: &mut Account) {
        if let Some(nickname) = self.resolved_nickname(&account.id) {
            account.nickname = nickname;
        }
        if let Some(comment) = &self.comment {
            account.comment = comment.clone();
        }
    }
}

/// Signup request body
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub user_id: Option<String>,
    pub password: Option<String>,
}

/// Patch request body.
///
/// `user_id` and `password` are captured only so they can be rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PatchAccountRequest {
    pub nickname: Option<String>,
    pub comment: Option<String>,
    pub user_id: Option<Value>,
    pub password: Option<Value>,
}
