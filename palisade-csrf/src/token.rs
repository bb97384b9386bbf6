//! Secrets, salts and masked tokens.
//!
//! All three are strings over [`crate::alphabet::SYMBOLS`] with a fixed
//! length. Their constructors either validate or draw fresh randomness, so a
//! value of one of these types is always well-formed.

use crate::alphabet::{self, ENGINE};
use crate::error::{CsrfError, Result};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Length of a [`Secret`].
pub const SECRET_LEN: usize = 32;

/// Length of a [`Salt`].
pub const SALT_LEN: usize = 32;

/// Length of a [`MaskedToken`]: salt followed by cipher.
pub const MASKED_TOKEN_LEN: usize = SALT_LEN + SECRET_LEN;

/// Draw `len` symbols from the OS entropy source.
///
/// `len` raw bytes are encoded and the first `len` symbols kept, so every
/// symbol carries six fresh random bits.
pub(crate) fn random_symbols(len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    OsRng.try_fill_bytes(&mut buf)?;

    let mut encoded = ENGINE.encode(&buf);
    encoded.truncate(len);
    Ok(encoded)
}

fn is_well_formed(value: &str, len: usize) -> bool {
    value.len() == len && alphabet::contains_only(value)
}

/// Per-client secret held by the token store.
///
/// Never rendered by `Debug`; there is no `Display`.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Generate a new random secret.
    pub fn generate() -> Result<Self> {
        random_symbols(SECRET_LEN).map(Self)
    }

    /// Accept `value` if it is exactly [`SECRET_LEN`] alphabet symbols.
    pub fn parse(value: &str) -> Option<Self> {
        is_well_formed(value, SECRET_LEN).then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Built by the unmask transform from alphabet symbols only.
    pub(crate) fn from_symbols(symbols: Vec<u8>) -> Self {
        Self(symbols.into_iter().map(char::from).collect())
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Single-use randomness mixed into a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    pub fn generate() -> Result<Self> {
        random_symbols(SALT_LEN).map(Self)
    }

    pub fn parse(value: &str) -> Option<Self> {
        is_well_formed(value, SALT_LEN).then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Wire form of a secret: `salt || cipher`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaskedToken(String);

impl MaskedToken {
    /// Accept `value` if it is exactly [`MASKED_TOKEN_LEN`] alphabet symbols.
    pub fn parse(value: &str) -> Option<Self> {
        is_well_formed(value, MASKED_TOKEN_LEN).then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub(crate) fn from_parts(salt: &Salt, cipher: Vec<u8>) -> Self {
        let mut token = String::with_capacity(MASKED_TOKEN_LEN);
        token.push_str(salt.as_str());
        token.extend(cipher.into_iter().map(char::from));
        Self(token)
    }

    /// Salt half and cipher half.
    pub(crate) fn split(&self) -> (&[u8], &[u8]) {
        self.0.as_bytes().split_at(SALT_LEN)
    }
}

impl FromStr for MaskedToken {
    type Err = CsrfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or(CsrfError::InvalidToken)
    }
}

impl fmt::Display for MaskedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MaskedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_shape() {
        for _ in 0..100 {
            let secret = Secret::generate().unwrap();
            assert_eq!(secret.as_str().len(), SECRET_LEN);
            assert!(alphabet::contains_only(secret.as_str()));
        }
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = Secret::generate().unwrap();
        let b = Secret::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_secret_parse_rejects_bad_input() {
        assert!(Secret::parse("").is_none());
        assert!(Secret::parse(&"A".repeat(31)).is_none());
        assert!(Secret::parse(&"A".repeat(33)).is_none());
        assert!(Secret::parse(&format!("{}+", "A".repeat(31))).is_none());
        assert!(Secret::parse(&"A".repeat(32)).is_some());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::parse(&"q".repeat(32)).unwrap();
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("qqqq"));
    }

    #[test]
    fn test_salt_shape() {
        let salt = Salt::generate().unwrap();
        assert_eq!(salt.as_str().len(), SALT_LEN);
        assert!(Salt::parse(salt.as_str()).is_some());
    }

    #[test]
    fn test_masked_token_parse() {
        assert!(MaskedToken::parse(&"-".repeat(64)).is_some());
        assert!(MaskedToken::parse(&"-".repeat(63)).is_none());
        assert!(MaskedToken::parse(&format!("{}=", "a".repeat(63))).is_none());
        assert!(matches!(
            "short".parse::<MaskedToken>(),
            Err(CsrfError::InvalidToken)
        ));
    }

    #[test]
    fn test_multibyte_input_is_rejected() {
        // 32 chars but 64 bytes
        let wide = "é".repeat(32);
        assert!(MaskedToken::parse(&wide).is_none());
        assert!(Secret::parse(&"é".repeat(16)).is_none());
    }
}
