//! shardnet keystore
//!
//! Signing keypair management and path utilities shared by the renter
//! and farmer binaries.
//!
//! ## Features
//!
//! - Ed25519 signing keypair loading/generation
//! - Cross-platform path expansion (`~`)
//! - On-disk key storage

mod keypair;
mod paths;

pub use keypair::{
    default_key_path, load_or_generate_keypair, load_or_generate_signing_keypair, save_keypair_bytes, KeystoreError,
};
pub use paths::{default_config_dir, default_keystore_dir, expand_path};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("keystore error: {0}")]
    Keystore(#[from] KeystoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
