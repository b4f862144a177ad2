//! Password Hashing
//! Mission: One-way credential transform with a salted, slow verification path

use bcrypt::{non_truncating_hash, non_truncating_verify, BcryptError};

/// Plaintext used to build the decoy hash. Never matches a real credential
/// because it contains a space, which the password pattern rejects.
const DECOY_PLAINTEXT: &str = "decoy credential";

/// Longest input bcrypt reads in full; its 72-byte block includes a
/// terminating NUL.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Raised when bcrypt cannot produce a hash (invalid cost, input longer
/// than [`MAX_PASSWORD_BYTES`], RNG failure).
#[derive(Debug, thiserror::Error)]
#[error("failed to hash password: {0}")]
pub struct HashError(#[from] BcryptError);

/// bcrypt-backed password hasher.
///
/// The salt is embedded in every token, so hashing the same plaintext twice
/// yields two different tokens that both verify. Input past
/// [`MAX_PASSWORD_BYTES`] is rejected instead of silently truncated, so two
/// passwords sharing a long prefix never verify against each other.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    decoy_hash: String,
}

impl PasswordHasher {
    /// Build a hasher with the given bcrypt cost (4..=31).
    pub fn new(cost: u32) -> Result<Self, HashError> {
        let decoy_hash = non_truncating_hash(DECOY_PLAINTEXT, cost)?;
        Ok(Self { cost, decoy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        Ok(non_truncating_hash(plaintext, self.cost)?)
    }

    /// Never fails: a malformed token or overlong input is a mismatch.
    pub fn verify(&self, plaintext: &str, token: &str) -> bool {
        non_truncating_verify(plaintext, token).unwrap_or(false)
    }

    /// Spend one verification's worth of work against the decoy hash.
    ///
    /// Used on the unknown-id path so it costs about as much as a real check.
    pub fn verify_decoy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.decoy_hash);
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let token = hasher.hash("hunter22").unwrap();

        assert_ne!(token, "hunter22");
        assert!(hasher.verify("hunter22", &token));
        assert!(!hasher.verify("hunter23", &token));
    }

    #[test]
    fn test_same_plaintext_gets_fresh_salt() {
        let hasher = hasher();
        let first = hasher.hash("hunter22").unwrap();
        let second = hasher.hash("hunter22").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("hunter22", &first));
        assert!(hasher.verify("hunter22", &second));
    }

    #[test]
    fn test_malformed_token_is_mismatch() {
        let hasher = hasher();

        assert!(!hasher.verify("hunter22", ""));
        assert!(!hasher.verify("hunter22", "not-a-bcrypt-token"));
        assert!(!hasher.verify("hunter22", "$2b$04$truncated"));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(PasswordHasher::new(3).is_err());
        assert!(PasswordHasher::new(32).is_err());
        assert_eq!(PasswordHasher::new(4).unwrap().cost(), 4);
    }

    #[test]
    fn test_input_past_bcrypt_limit_rejected() {
        let hasher = hasher();
        // 20 characters, 77 bytes; identical in the first 76 bytes
        let first = format!("{}a", "\u{1F600}".repeat(19));
        let second = format!("{}b", "\u{1F600}".repeat(19));
        assert!(first.len() > MAX_PASSWORD_BYTES);

        assert!(hasher.hash(&first).is_err());

        let at_limit = "x".repeat(MAX_PASSWORD_BYTES);
        let token = hasher.hash(&at_limit).unwrap();
        assert!(hasher.verify(&at_limit, &token));
        assert!(!hasher.verify(&format!("{at_limit}y"), &token));
        assert!(!hasher.verify(&second, &token));
    }

    #[test]
    fn test_decoy_never_matches_valid_password() {
        let hasher = hasher();
        assert!(!hasher.verify("password1", &hasher.decoy_hash));
        assert!(hasher.verify(DECOY_PLAINTEXT, &hasher.decoy_hash));
    }
}
