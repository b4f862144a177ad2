//! Input patterns for account fields. Lengths count characters, not bytes;
//! passwords are additionally capped at the hasher's byte limit.

use crate::auth::password::MAX_PASSWORD_BYTES;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref USER_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9]{6,20}$").unwrap();
    // Spaces are deliberately excluded along with the control characters
    static ref PASSWORD_RE: Regex = Regex::new(r"^[^\r\n\t\x0C\x0B\x07 ]{8,20}$").unwrap();
    static ref NICKNAME_RE: Regex = Regex::new(r"^[^\x07\x0C\r\x0B]{0,30}$").unwrap();
    static ref COMMENT_RE: Regex = Regex::new(r"^[^\x07\x0C\r\x0B]{0,100}$").unwrap();
}

pub fn is_valid_user_id(user_id: &str) -> bool {
    USER_ID_RE.is_match(user_id)
}

pub fn is_valid_password(password: &str) -> bool {
    password.len() <= MAX_PASSWORD_BYTES && PASSWORD_RE.is_match(password)
}

pub fn is_valid_nickname(nickname: &str) -> bool {
    NICKNAME_RE.is_match(nickname)
}

pub fn is_valid_comment(comment: &str) -> bool {
    COMMENT_RE.is_match(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_pattern() {
        assert!(is_valid_user_id("alice01"));
        assert!(is_valid_user_id("ABCdef"));
        assert!(is_valid_user_id(&"a".repeat(20)));

        assert!(!is_valid_user_id("short"));
        assert!(!is_valid_user_id(&"a".repeat(21)));
        assert!(!is_valid_user_id("alice_01"));
        assert!(!is_valid_user_id("alice01\n"));
        assert!(!is_valid_user_id("ålice01"));
    }

    #[test]
    fn test_password_pattern() {
        assert!(is_valid_password("hunter22"));
        assert!(is_valid_password("p@ss:w0rd!"));
        assert!(is_valid_password(&"x".repeat(20)));

        assert!(!is_valid_password("short1"));
        assert!(!is_valid_password(&"x".repeat(21)));
        assert!(!is_valid_password("hunter 22"));
        assert!(!is_valid_password("hunter\t22"));
        assert!(!is_valid_password("hunter\x0722"));
    }

    #[test]
    fn test_password_byte_limit() {
        // 20 characters, 71 bytes
        assert!(is_valid_password(&format!("{}abc", "\u{1F600}".repeat(17))));
        // 18 characters, 72 bytes
        assert!(!is_valid_password(&"\u{1F600}".repeat(18)));
        // 20 characters but 77 bytes
        assert!(!is_valid_password(&format!("{}a", "\u{1F600}".repeat(19))));
        assert!(!is_valid_password(&"\u{1F600}".repeat(20)));
    }

    #[test]
    fn test_nickname_pattern() {
        assert!(is_valid_nickname(""));
        assert!(is_valid_nickname("Al"));
        assert!(is_valid_nickname("アリス with spaces"));
        assert!(is_valid_nickname(&"ア".repeat(30)));

        assert!(!is_valid_nickname(&"a".repeat(31)));
        assert!(!is_valid_nickname("bell\x07"));
        assert!(!is_valid_nickname("carriage\rreturn"));
    }

    #[test]
    fn test_comment_pattern() {
        assert!(is_valid_comment(""));
        assert!(is_valid_comment(&"c".repeat(100)));
        assert!(is_valid_comment("line one\nline two"));

        assert!(!is_valid_comment(&"c".repeat(101)));
        assert!(!is_valid_comment("form\x0Cfeed"));
        assert!(!is_valid_comment("vertical\x0Btab"));
    }
}
