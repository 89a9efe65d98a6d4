//! Keypair generation and on-disk persistence
//!
//! A renter or farmer's identity is a single ed25519 signing keypair.
//! The keystore only ever persists the raw 32-byte secret; the public
//! key and every other derived value are recomputed on load.

use std::path::{Path, PathBuf};

use thiserror::Error;

use shardnet_crypto::SigningKeypair;

use crate::paths::default_keystore_dir;

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("failed to read key file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write key file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("key file {path} does not hold a 32-byte secret (found {found} bytes)")]
    MalformedSecret { path: PathBuf, found: usize },
}

/// `<default_keystore_dir>/identity.key`.
pub fn default_key_path() -> PathBuf {
    default_keystore_dir().join("identity.key")
}

/// Write raw secret key bytes to `path`, creating parent directories as
/// needed.
pub fn save_keypair_bytes(path: &Path, bytes: &[u8]) -> Result<(), KeystoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| KeystoreError::Write { path: path.to_path_buf(), source })?;
    }
    std::fs::write(path, bytes).map_err(|source| KeystoreError::Write { path: path.to_path_buf(), source })
}

/// Load the raw secret bytes at `path`, generating and persisting a
/// fresh random secret if the file does not yet exist.
pub fn load_or_generate_keypair(path: &Path) -> Result<[u8; 32], KeystoreError> {
    if path.exists() {
        let bytes = std::fs::read(path).map_err(|source| KeystoreError::Read { path: path.to_path_buf(), source })?;
        let len = bytes.len();
        <[u8; 32]>::try_from(bytes).map_err(|_| KeystoreError::MalformedSecret { path: path.to_path_buf(), found: len })
    } else {
        let secret = SigningKeypair::generate().secret_key_bytes();
        save_keypair_bytes(path, &secret)?;
        Ok(secret)
    }
}

/// Load (or generate and persist) the renter/farmer identity keypair
/// at `path`.
pub fn load_or_generate_signing_keypair(path: &Path) -> Result<SigningKeypair, KeystoreError> {
    let secret = load_or_generate_keypair(path)?;
    Ok(SigningKeypair::from_secret_bytes(&secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shardnet-keystore-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_generates_and_persists_on_first_load() {
        let path = temp_path("generate");
        let _ = std::fs::remove_file(&path);

        let keypair = load_or_generate_signing_keypair(&path).unwrap();
        assert!(path.exists());

        let reloaded = load_or_generate_signing_keypair(&path).unwrap();
        assert_eq!(keypair.public_key_bytes(), reloaded.public_key_bytes());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_secret_is_rejected() {
        let path = temp_path("malformed");
        std::fs::write(&path, b"too short").unwrap();

        let result = load_or_generate_signing_keypair(&path);
        assert!(matches!(result, Err(KeystoreError::MalformedSecret { found: 9, .. })));

        let _ = std::fs::remove_file(&path);
    }
}
