//! Transfer token
//!
//! An opaque bearer credential a farmer issues to authorize exactly one
//! transfer (CONSIGN or RETRIEVE) of one specific shard by one specific
//! client, valid until an expiration instant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte random token, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token(pub [u8; 32]);

impl Token {
    /// Generate a new random token.
    pub fn generate() -> Self {
        Token(shardnet_crypto::random_32())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Some(Token(out))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.to_hex())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
