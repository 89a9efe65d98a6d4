use ed25519_dalek::{Signature as DalekSignature, Signer, Verifier, VerifyingKey};

use crate::keys::SigningKeypair;

/// Sign arbitrary data with a signing keypair.
pub fn sign_data(keypair: &SigningKeypair, data: &[u8]) -> [u8; 64] {
    let signature: DalekSignature = keypair.signing_key.sign(data);
    signature.to_bytes()
}

/// Verify a signature against a raw public key.
pub fn verify_signature(pubkey: &[u8; 32], data: &[u8], signature: &[u8; 64]) -> bool {
    let verifying_key = match VerifyingKey::from_bytes(pubkey) {
        Ok(vk) => vk,
        Err(_) => return false,
    };
    let signature = DalekSignature::from_bytes(signature);
    verifying_key.verify(data, &signature).is_ok()
}
