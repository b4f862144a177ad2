//! API response bodies

use crate::accounts::Account;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Account summary returned by signup
#[derive(Debug, Serialize)]
pub struct SignupUser {
    pub user_id: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user: SignupUser,
}

/// Public profile; the comment is omitted while empty
#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub user_id: String,
    pub nickname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl From<Account> for UserDetails {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.id,
            nickname: account.nickname,
            comment: account.comment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetailsResponse {
    pub message: &'static str,
    pub user: UserDetails,
}

#[derive(Debug, Serialize)]
pub struct UpdatedProfile {
    pub nickname: String,
    pub comment: String,
}

/// Patch result. `recipe` is the established wire name for the list.
#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub message: &'static str,
    pub recipe: Vec<UpdatedProfile>,
}
