//! Reversible masking of secrets.
//!
//! `mask` adds a fresh salt to the secret symbol by symbol, modulo the
//! alphabet size, and prepends the salt; `unmask` subtracts it again. Every
//! call to [`mask`] yields a different token for the same secret, so a token
//! seen in a log, a referrer or a compressed response body does not reveal a
//! stable value.
//!
//! This is obfuscation, not authentication: whoever holds a token can recover
//! the secret. Verification is an exact comparison against the server-held
//! secret and nothing more.

use crate::alphabet::{self, SIZE};
use crate::error::Result;
use crate::token::{MaskedToken, Salt, Secret};

/// Mask `secret` with a freshly generated salt.
pub fn mask(secret: &Secret) -> Result<MaskedToken> {
    let salt = Salt::generate()?;
    Ok(mask_with_salt(secret, &salt))
}

/// Mask `secret` with a caller-supplied salt.
pub fn mask_with_salt(secret: &Secret, salt: &Salt) -> MaskedToken {
    // Both inputs were alphabet-checked on construction.
    let cipher = secret
        .as_bytes()
        .iter()
        .zip(salt.as_bytes())
        .map(|(&s, &t)| {
            let x = alphabet::index_of(s).unwrap_or_default();
            let y = alphabet::index_of(t).unwrap_or_default();
            alphabet::symbol_at((x + y) % SIZE)
        })
        .collect();

    MaskedToken::from_parts(salt, cipher)
}

/// Recover the secret a token was masked from.
pub fn unmask(token: &MaskedToken) -> Secret {
    let (salt, cipher) = token.split();
    let symbols = cipher
        .iter()
        .zip(salt)
        .map(|(&c, &t)| {
            let x = alphabet::index_of(c).unwrap_or_default();
            let y = alphabet::index_of(t).unwrap_or_default();
            if x < y {
                alphabet::symbol_at(SIZE + x - y)
            } else {
                alphabet::symbol_at(x - y)
            }
        })
        .collect();

    Secret::from_symbols(symbols)
}

/// Unmask raw client input.
///
/// Returns `None` for anything that is not a well-formed masked token, which
/// callers treat as a failed verification.
pub fn unmask_str(raw: &str) -> Option<Secret> {
    MaskedToken::parse(raw).map(|token| unmask(&token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{MASKED_TOKEN_LEN, SALT_LEN};

    fn secret(s: &str) -> Secret {
        Secret::parse(s).unwrap()
    }

    #[test]
    fn test_round_trip_random() {
        for _ in 0..200 {
            let s = Secret::generate().unwrap();
            let token = mask(&s).unwrap();
            assert_eq!(token.as_str().len(), MASKED_TOKEN_LEN);
            assert!(alphabet::contains_only(token.as_str()));
            assert_eq!(unmask(&token), s);
        }
    }

    #[test]
    fn test_round_trip_extremes() {
        let all_low = secret(&"A".repeat(32));
        let all_high = secret(&"-".repeat(32));
        for salt in ["A".repeat(32), "-".repeat(32), "_".repeat(32)] {
            let salt = Salt::parse(&salt).unwrap();
            assert_eq!(unmask(&mask_with_salt(&all_low, &salt)), all_low);
            assert_eq!(unmask(&mask_with_salt(&all_high, &salt)), all_high);
        }
    }

    #[test]
    fn test_known_vector() {
        // 'B' (1) + 'C' (2) = 'D' (3); '-' (63) + 'B' (1) wraps to 'A' (0)
        let s = secret(&format!("B{}", "-".repeat(31)));
        let salt = Salt::parse(&format!("C{}", "B".repeat(31))).unwrap();
        let token = mask_with_salt(&s, &salt);

        assert_eq!(&token.as_str()[..SALT_LEN], salt.as_str());
        assert_eq!(&token.as_str()[SALT_LEN..], format!("D{}", "A".repeat(31)));
        assert_eq!(unmask(&token), s);
    }

    #[test]
    fn test_zero_salt_is_identity() {
        let s = Secret::generate().unwrap();
        let salt = Salt::parse(&"A".repeat(32)).unwrap();
        let token = mask_with_salt(&s, &salt);
        assert_eq!(&token.as_str()[SALT_LEN..], s.as_str());
    }

    #[test]
    fn test_different_salts_give_different_tokens() {
        let s = Secret::generate().unwrap();
        let salt1 = Salt::parse(&"A".repeat(32)).unwrap();
        let salt2 = Salt::parse(&"B".repeat(32)).unwrap();

        let t1 = mask_with_salt(&s, &salt1);
        let t2 = mask_with_salt(&s, &salt2);
        assert_ne!(t1, t2);
        assert_eq!(unmask(&t1), s);
        assert_eq!(unmask(&t2), s);
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let s = Secret::generate().unwrap();
        assert_ne!(mask(&s).unwrap(), mask(&s).unwrap());
    }

    #[test]
    fn test_unmask_str_rejects_malformed() {
        assert!(unmask_str("").is_none());
        assert!(unmask_str(&"A".repeat(63)).is_none());
        assert!(unmask_str(&"A".repeat(65)).is_none());
        assert!(unmask_str(&format!("{}!", "A".repeat(63))).is_none());
        assert!(unmask_str(&"A".repeat(64)).is_some());
    }

    #[test]
    fn test_tampered_token_unmasks_differently() {
        let s = Secret::generate().unwrap();
        let token = mask(&s).unwrap().into_string();

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_ne!(unmask_str(&tampered).unwrap(), s);
    }
}
