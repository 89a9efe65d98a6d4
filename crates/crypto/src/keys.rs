use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("invalid public key length")]
    InvalidPublicKey,
    #[error("invalid secret key length")]
    InvalidSecretKey,
}

/// Ed25519 keypair identifying a renter or farmer and used to sign
/// contracts and exchange reports.
pub struct SigningKeypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Clone for SigningKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
            verifying_key: self.verifying_key,
        }
    }
}

impl SigningKeypair {
    /// Generate a new random signing keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Reconstruct a keypair from a raw 32-byte secret, e.g. loaded from
    /// the keystore.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_keypair_roundtrip() {
        let kp = SigningKeypair::generate();
        let pubkey = kp.public_key_bytes();
        let secret = kp.secret_key_bytes();

        let restored = SigningKeypair::from_secret_bytes(&secret);
        assert_eq!(restored.public_key_bytes(), pubkey);
    }

    #[test]
    fn test_distinct_keypairs_differ() {
        let a = SigningKeypair::generate();
        let b = SigningKeypair::generate();
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }
}
