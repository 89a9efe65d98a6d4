use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

/// 20-byte RIPEMD-160 digest, the canonical shard/farmer identifier width.
pub type Id160 = [u8; 20];

/// 32-byte SHA-256 digest.
pub type Id256 = [u8; 32];

/// 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// 64-byte Ed25519 signature (BigArray needed since serde has no native
/// support for arrays longer than 32 elements).
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "BigArray")] pub [u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}
impl Eq for Signature {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let sig = Signature([7u8; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        let restored: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, restored);
    }

    #[test]
    fn test_signature_debug_is_hex() {
        let sig = Signature([0u8; 64]);
        let debug = format!("{:?}", sig);
        assert!(debug.starts_with("Signature("));
    }
}
