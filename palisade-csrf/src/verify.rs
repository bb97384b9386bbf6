//! Per-request verification state machine.
//!
//! ```text
//! NoToken --issue--> Issued --check--> Verified
//!                          \---------> Rejected
//! ```
//!
//! A request that arrives with a valid stored secret starts in `Issued`.
//! `Verified` and `Rejected` are terminal; nothing is retried.

use crate::mask;
use crate::token::{MASKED_TOKEN_LEN, SECRET_LEN, Secret};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No valid secret stored for this client
    NoToken,
    /// A secret exists (loaded or freshly issued)
    Issued,
    /// The supplied token matches the secret
    Verified,
    /// Verification failed; the request must not proceed
    Rejected,
}

impl TokenState {
    /// Initial state for the secret loaded from the store.
    pub fn begin(stored: Option<&Secret>) -> Self {
        if stored.is_some() {
            TokenState::Issued
        } else {
            TokenState::NoToken
        }
    }

    /// A new secret has been generated and will be persisted.
    pub fn issue(self) -> Self {
        match self {
            TokenState::NoToken => TokenState::Issued,
            other => other,
        }
    }

    /// Check the client-supplied token against `secret`.
    ///
    /// Only `Issued` can move to `Verified`. Anything else fails closed.
    pub fn check(self, supplied: Option<&str>, secret: &Secret) -> Self {
        match self {
            TokenState::Issued => match supplied {
                Some(token) if verify_token(token, secret.as_str()) => TokenState::Verified,
                _ => TokenState::Rejected,
            },
            TokenState::Verified => TokenState::Verified,
            TokenState::NoToken | TokenState::Rejected => TokenState::Rejected,
        }
    }

    /// Whether the request may reach downstream handling.
    pub fn allows_request(&self) -> bool {
        !matches!(self, TokenState::Rejected)
    }
}

/// Compare a client-supplied masked token with a stored secret.
///
/// False unless the token is exactly 64 symbols, the secret exactly 32, and
/// the token unmasks to the secret. Malformed input never panics.
pub fn verify_token(supplied: &str, secret: &str) -> bool {
    if supplied.len() != MASKED_TOKEN_LEN || secret.len() != SECRET_LEN {
        return false;
    }

    let Some(secret) = Secret::parse(secret) else {
        return false;
    };

    match mask::unmask_str(supplied) {
        Some(unmasked) => unmasked == secret,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Salt;

    #[test]
    fn test_length_rejection() {
        let secret = Secret::generate().unwrap();
        let token = mask::mask(&secret).unwrap();

        assert!(verify_token(token.as_str(), secret.as_str()));
        assert!(!verify_token(&token.as_str()[..63], secret.as_str()));
        assert!(!verify_token(&format!("{}A", token), secret.as_str()));
        assert!(!verify_token(token.as_str(), &secret.as_str()[..31]));
        assert!(!verify_token(token.as_str(), &format!("{}A", secret.as_str())));
        assert!(!verify_token("", ""));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let secret = Secret::generate().unwrap();
        let other = Secret::generate().unwrap();
        let token = mask::mask(&secret).unwrap();
        assert!(!verify_token(token.as_str(), other.as_str()));
    }

    #[test]
    fn test_foreign_symbols_rejected() {
        let secret = Secret::generate().unwrap();
        let bad = format!("{}+", "A".repeat(63));
        assert!(!verify_token(&bad, secret.as_str()));

        let token = mask::mask(&secret).unwrap();
        let bad_secret = format!("{}=", &secret.as_str()[..31]);
        assert!(!verify_token(token.as_str(), &bad_secret));
    }

    #[test]
    fn test_every_salt_verifies() {
        let secret = Secret::generate().unwrap();
        for salt in ["A".repeat(32), "z".repeat(32), "-".repeat(32)] {
            let token = mask::mask_with_salt(&secret, &Salt::parse(&salt).unwrap());
            assert!(verify_token(token.as_str(), secret.as_str()));
        }
    }

    #[test]
    fn test_state_transitions() {
        let secret = Secret::generate().unwrap();
        let token = mask::mask(&secret).unwrap();

        assert_eq!(TokenState::begin(None), TokenState::NoToken);
        assert_eq!(TokenState::begin(Some(&secret)), TokenState::Issued);
        assert_eq!(TokenState::NoToken.issue(), TokenState::Issued);

        let state = TokenState::Issued;
        assert_eq!(state.check(Some(token.as_str()), &secret), TokenState::Verified);
        assert_eq!(state.check(None, &secret), TokenState::Rejected);
        assert_eq!(state.check(Some("garbage"), &secret), TokenState::Rejected);
    }

    #[test]
    fn test_fail_closed_from_no_token() {
        let secret = Secret::generate().unwrap();
        let token = mask::mask(&secret).unwrap();
        assert_eq!(
            TokenState::NoToken.check(Some(token.as_str()), &secret),
            TokenState::Rejected
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TokenState::Rejected.allows_request());
        assert!(TokenState::Verified.allows_request());
        assert!(TokenState::Issued.allows_request());

        let secret = Secret::generate().unwrap();
        assert_eq!(
            TokenState::Rejected.issue().check(None, &secret),
            TokenState::Rejected
        );
    }
}
