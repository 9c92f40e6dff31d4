//! Checksums and short random identifiers.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Alphabet of short uuids: no look-alike characters (0, 1, I, O, l).
const SHORT_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Calculate SHA-256 checksum of content.
pub fn calculate_checksum(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    hex::encode(hash)
}

/// Random string of `length` characters from the short uuid alphabet.
pub fn short_suffix(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| SHORT_ALPHABET[rng.gen_range(0..SHORT_ALPHABET.len())] as char)
        .collect()
}
