//! Token table
//!
//! Tracks one-shot bearer tokens authorizing a single CONSIGN or RETRIEVE
//! transfer. The in-memory implementation mirrors the double-keyed layout
//! described for the on-disk store (`"TK" + token`, `"EX" + expires`) with
//! a `BTreeMap` expiry index standing in for the range-scan key.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use shardnet_core::{PublicKey, ShardHash, Token};

use crate::error::{FarmerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOperation {
    Consign,
    Retrieve,
}

#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub shard_hash: ShardHash,
    pub client_id: PublicKey,
    pub operation: TokenOperation,
    /// Unix milliseconds.
    pub expires_at: i64,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn issue(&self, token: Token, entry: TokenEntry);
    /// Checks existence, expiry, and hash match, in that order, so the
    /// caller gets the first assertion that failed.
    async fn authorize(&self, token: &Token, hash: &ShardHash, now: i64) -> Result<TokenEntry>;
    async fn invalidate(&self, token: &Token);
    /// Removes every entry whose `expires_at <= now`, returning the count.
    async fn reap_expired(&self, now: i64) -> usize;
}

struct State {
    tokens: HashMap<Token, TokenEntry>,
    expiry_index: BTreeMap<(i64, Token), ()>,
}

pub struct InMemoryTokenStore {
    state: Mutex<State>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                tokens: HashMap::new(),
                expiry_index: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn issue(&self, token: Token, entry: TokenEntry) {
        let mut state = self.state.lock().expect("token store poisoned");
        state.expiry_index.insert((entry.expires_at, token), ());
        state.tokens.insert(token, entry);
    }

    async fn authorize(&self, token: &Token, hash: &ShardHash, now: i64) -> Result<TokenEntry> {
        let mut state = self.state.lock().expect("token store poisoned");

        let Some(entry) = state.tokens.get(token).cloned() else {
            return Err(FarmerError::TokenNotFound);
        };
        if entry.expires_at <= now {
            state.tokens.remove(token);
            state.expiry_index.remove(&(entry.expires_at, *token));
            return Err(FarmerError::TokenExpired);
        }
        if &entry.shard_hash != hash {
            return Err(FarmerError::TokenHashMismatch);
        }
        Ok(entry)
    }

    async fn invalidate(&self, token: &Token) {
        let mut state = self.state.lock().expect("token store poisoned");
        if let Some(entry) = state.tokens.remove(token) {
            state.expiry_index.remove(&(entry.expires_at, *token));
        }
    }

    async fn reap_expired(&self, now: i64) -> usize {
        let mut state = self.state.lock().expect("token store poisoned");
        let expired: Vec<(i64, Token)> = state
            .expiry_index
            .range(..(now + 1, Token([0u8; 32])))
            .map(|(k, _)| *k)
            .collect();
        for key in &expired {
            state.tokens.remove(&key.1);
            state.expiry_index.remove(key);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: ShardHash, expires_at: i64) -> TokenEntry {
        TokenEntry {
            shard_hash: hash,
            client_id: [9u8; 32],
            operation: TokenOperation::Consign,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_authorize_unknown_token() {
        let store = InMemoryTokenStore::new();
        let result = store.authorize(&Token::generate(), &[0u8; 20], 0).await;
        assert!(matches!(result, Err(FarmerError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_authorize_expired_token() {
        let store = InMemoryTokenStore::new();
        let token = Token::generate();
        store.issue(token, entry([1u8; 20], 100)).await;

        let result = store.authorize(&token, &[1u8; 20], 200).await;
        assert!(matches!(result, Err(FarmerError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_authorize_hash_mismatch() {
        let store = InMemoryTokenStore::new();
        let token = Token::generate();
        store.issue(token, entry([1u8; 20], 1000)).await;

        let result = store.authorize(&token, &[2u8; 20], 0).await;
        assert!(matches!(result, Err(FarmerError::TokenHashMismatch)));
    }

    #[tokio::test]
    async fn test_authorize_success() {
        let store = InMemoryTokenStore::new();
        let token = Token::generate();
        store.issue(token, entry([1u8; 20], 1000)).await;

        let result = store.authorize(&token, &[1u8; 20], 0).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalidate_removes_token() {
        let store = InMemoryTokenStore::new();
        let token = Token::generate();
        store.issue(token, entry([1u8; 20], 1000)).await;
        store.invalidate(&token).await;

        let result = store.authorize(&token, &[1u8; 20], 0).await;
        assert!(matches!(result, Err(FarmerError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_reap_expired_removes_only_past_entries() {
        let store = InMemoryTokenStore::new();
        let expired = Token::generate();
        let live = Token::generate();
        store.issue(expired, entry([1u8; 20], 100)).await;
        store.issue(live, entry([2u8; 20], 10_000)).await;

        let reaped = store.reap_expired(500).await;
        assert_eq!(reaped, 1);
        assert!(matches!(
            store.authorize(&expired, &[1u8; 20], 500).await,
            Err(FarmerError::TokenNotFound)
        ));
        assert!(store.authorize(&live, &[2u8; 20], 500).await.is_ok());
    }
}
