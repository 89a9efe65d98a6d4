//! Canonical hashing primitives
//!
//! Every identity and commitment in the network (shard hashes, Merkle leaf
//! commitments) is `rmd160(sha256(x))`. This crate is the single place that
//! composition lives; other crates call through here rather than
//! re-deriving it.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// RIPEMD-160 of `data`.
pub fn rmd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// The canonical double hash used for shard identity and Merkle leaves:
/// `rmd160(sha256(data))`.
pub fn rmd160_sha256(data: &[u8]) -> [u8; 20] {
    rmd160(&sha256(data))
}

/// Generate a random 32-byte value, used for audit challenges and bearer
/// tokens alike.
pub fn random_32() -> [u8; 32] {
    use rand::rngs::OsRng;
    use rand::RngCore;
    let mut buf = [0u8; 32];
    OsRng.fill_bytes(&mut buf);
    buf
}
