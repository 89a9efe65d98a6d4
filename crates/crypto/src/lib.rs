//! shardnet cryptography
//!
//! Hashing, keypairs, and signing primitives used across the storage
//! network: shard/challenge hashing, Ed25519 contract signatures, and
//! random challenge/token generation.

mod hash;
mod keys;
mod sign;

pub use hash::*;
pub use keys::*;
pub use sign::*;
