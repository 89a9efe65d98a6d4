//! Request authentication
//!
//! Every outbound bridge request authenticates one of two ways: HTTP
//! basic (email + `sha256(password)`) or a signature over
//! `METHOD\nURI\nPAYLOAD`, sent as `x-pubkey`/`x-signature` headers. The
//! payload is the stringified query for GET/DELETE, the JSON body
//! otherwise. Every request also carries a random `__nonce`.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use shardnet_crypto::{sha256, sign_data, SigningKeypair};

/// How a renter authenticates to the bridge.
#[derive(Clone)]
pub enum Credentials {
    Basic { email: String, password: String },
    Signature { keypair: Arc<SigningKeypair> },
}

impl Credentials {
    pub fn basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic { email: email.into(), password: password.into() }
    }

    pub fn signature(keypair: Arc<SigningKeypair>) -> Self {
        Credentials::Signature { keypair }
    }
}

/// The headers (and, for basic auth, the `Authorization` value) that
/// should be attached to one outbound request.
pub struct AuthHeaders {
    pub authorization: Option<String>,
    pub pubkey: Option<String>,
    pub signature: Option<String>,
}

/// Build the signable string `METHOD\nURI\nPAYLOAD` and, for signature
/// auth, sign it; for basic auth, build the `Authorization` header value.
pub fn build_auth(creds: &Credentials, method: &str, uri: &str, payload: &str) -> AuthHeaders {
    match creds {
        Credentials::Basic { email, password } => {
            let password_hash = hex::encode(sha256(password.as_bytes()));
            let token = BASE64.encode(format!("{email}:{password_hash}").as_bytes());
            AuthHeaders {
                authorization: Some(format!("Basic {token}")),
                pubkey: None,
                signature: None,
            }
        }
        Credentials::Signature { keypair } => {
            let signable = format!("{method}\n{uri}\n{payload}");
            let signature = sign_data(keypair, signable.as_bytes());
            AuthHeaders {
                authorization: None,
                pubkey: Some(hex::encode(keypair.public_key_bytes())),
                signature: Some(hex::encode(signature)),
            }
        }
    }
}

/// A fresh random nonce for the `__nonce` request parameter.
pub fn new_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}
