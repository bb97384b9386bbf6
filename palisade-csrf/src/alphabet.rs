//! The 64-symbol token alphabet.
//!
//! Secrets, salts and masked tokens are all strings over this alphabet. The
//! masking transform works on symbol *indices*, so the order below is part of
//! the wire contract: changing it invalidates every persisted secret.

use base64::{alphabet::Alphabet, engine::GeneralPurpose, engine::general_purpose::NO_PAD};

/// Token symbols in index order.
pub const SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz_-";

/// Number of symbols, the modulus of the masking arithmetic.
pub const SIZE: u8 = 64;

const BYTES: &[u8] = SYMBOLS.as_bytes();

const INVALID: u8 = u8::MAX;

static INDEX: [u8; 256] = build_index();

const fn build_index() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < BYTES.len() {
        table[BYTES[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const TOKEN_ALPHABET: Alphabet = match Alphabet::new(SYMBOLS) {
    Ok(alphabet) => alphabet,
    Err(_) => panic!("token alphabet must be 64 unique printable symbols"),
};

/// URL-safe, unpadded base-64 engine over [`SYMBOLS`].
pub(crate) const ENGINE: GeneralPurpose = GeneralPurpose::new(&TOKEN_ALPHABET, NO_PAD);

/// Index of `symbol` in the alphabet.
#[inline]
pub fn index_of(symbol: u8) -> Option<u8> {
    match INDEX[symbol as usize] {
        INVALID => None,
        index => Some(index),
    }
}

/// Symbol at `index`, reduced modulo [`SIZE`].
#[inline]
pub fn symbol_at(index: u8) -> u8 {
    BYTES[(index % SIZE) as usize]
}

/// Whether every byte of `s` is an alphabet symbol.
pub fn contains_only(s: &str) -> bool {
    s.bytes().all(|b| index_of(b).is_some())
}
