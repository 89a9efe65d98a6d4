//! Farmer-side shard server
//!
//! Exposes the CONSIGN/RETRIEVE HTTP endpoint pair, gated by one-time
//! tokens, with hash verification, size capping, and concurrency
//! accounting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use shardnet_core::{PublicKey, ShardHash, Token};
use shardnet_crypto::rmd160;

use crate::error::{FarmerError, Result};
use crate::exchange_sink::{ExchangeSink, NullExchangeSink};
use crate::storage::ShardStorage;
use crate::token::{TokenEntry, TokenOperation, TokenStore};

/// Minimum headroom required beyond a shard's declared size before the
/// farmer will accept it (§9 open question in the spec, fixed here).
pub const FREE_SPACE_PADDING: u64 = 256 * 1024 * 1024;

pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(60);

struct AdmittedItem {
    data_size: u64,
}

#[derive(Clone)]
pub struct ShardServer {
    storage: Arc<dyn ShardStorage>,
    tokens: Arc<dyn TokenStore>,
    exchanges: Arc<dyn ExchangeSink>,
    admitted: Arc<Mutex<HashMap<ShardHash, AdmittedItem>>>,
    active_transfers: Arc<AtomicI64>,
    farmer_id: PublicKey,
    offer_backoff_limit: i64,
}

impl ShardServer {
    pub fn new(storage: Arc<dyn ShardStorage>, tokens: Arc<dyn TokenStore>, farmer_id: PublicKey) -> Self {
        Self {
            storage,
            tokens,
            exchanges: Arc::new(NullExchangeSink),
            admitted: Arc::new(Mutex::new(HashMap::new())),
            active_transfers: Arc::new(AtomicI64::new(0)),
            farmer_id,
            offer_backoff_limit: 50,
        }
    }

    pub fn with_exchange_sink(mut self, sink: Arc<dyn ExchangeSink>) -> Self {
        self.exchanges = sink;
        self
    }

    pub fn with_offer_backoff_limit(mut self, limit: i64) -> Self {
        self.offer_backoff_limit = limit;
        self
    }

    /// Record that a contract for `hash` has been accepted upstream,
    /// reserving a storage item the CONSIGN flow will later fill.
    pub fn admit_contract(&self, hash: ShardHash, data_size: u64) {
        self.admitted.lock().expect("admitted map poisoned").insert(hash, AdmittedItem { data_size });
    }

    pub fn issue_token(&self, token: Token, shard_hash: ShardHash, client_id: PublicKey, operation: TokenOperation, ttl: Duration) {
        let expires_at = now_millis() + ttl.as_millis() as i64;
        let entry = TokenEntry {
            shard_hash,
            client_id,
            operation,
            expires_at,
        };
        let tokens = self.tokens.clone();
        tokio::spawn(async move { tokens.issue(token, entry).await });
    }

    pub fn active_transfers(&self) -> i64 {
        self.active_transfers.load(Ordering::SeqCst)
    }

    /// Gate used by upstream contract-offer acceptance: the farmer stops
    /// accepting new contracts once too many transfers are in flight.
    pub fn accepts_new_contracts(&self) -> bool {
        self.active_transfers() < self.offer_backoff_limit
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/shards/{hash}", post(consign))
            .route("/shards/{hash}", get(retrieve))
            .with_state(self)
    }

    /// Spawn the periodic expired-token reaper. Runs until the returned
    /// handle is dropped or aborted.
    pub fn spawn_reaper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let tokens = self.tokens.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let reaped = tokens.reap_expired(now_millis()).await;
                if reaped > 0 {
                    debug!(reaped, "reaped expired tokens");
                }
            }
        })
    }
}

fn now_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}

fn parse_hash(raw: &str) -> Result<ShardHash> {
    let bytes = hex::decode(raw).map_err(|_| FarmerError::ShardNotFound)?;
    bytes.try_into().map_err(|_| FarmerError::ShardNotFound)
}

fn parse_token(raw: &str) -> Result<Token> {
    Token::from_hex(raw).ok_or(FarmerError::TokenNotFound)
}

#[derive(Debug, Deserialize)]
struct TransferQuery {
    token: String,
}

struct TransferGuard {
    counter: Arc<AtomicI64>,
}

impl TransferGuard {
    fn enter(counter: Arc<AtomicI64>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn consign(
    State(server): State<ShardServer>,
    Path(hash_hex): Path<String>,
    Query(query): Query<TransferQuery>,
    request: Request,
) -> impl IntoResponse {
    let _guard = TransferGuard::enter(server.active_transfers.clone());
    match consign_inner(&server, &hash_hex, &query.token, request).await {
        Ok(status) => status.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn consign_inner(server: &ShardServer, hash_hex: &str, token_hex: &str, request: Request) -> Result<StatusCode> {
    let hash = parse_hash(hash_hex)?;
    let token = parse_token(token_hex)?;
    let now = now_millis();
    let auth = server.tokens.authorize(&token, &hash, now).await?;

    let data_size = {
        let admitted = server.admitted.lock().expect("admitted map poisoned");
        match admitted.get(&hash) {
            Some(item) => item.data_size,
            None => return Err(FarmerError::ShardNotFound),
        }
    };

    if server.storage.exists(&hash).await {
        let mut report = shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
        report.end(now_millis(), shardnet_core::ExchangeResultCode::Success, "SHARD_EXISTS");
        server.exchanges.submit(report).await;
        return Ok(StatusCode::NOT_MODIFIED);
    }

    let available = server.storage.available_space().await.map_err(FarmerError::Io)?;
    if available.saturating_sub(data_size) <= FREE_SPACE_PADDING {
        return Err(FarmerError::InsufficientSpace);
    }

    let mut hasher = Sha256::new();
    let mut buf = Vec::with_capacity(data_size as usize);
    let mut body_stream = request.into_body().into_data_stream();

    while let Some(chunk) = body_stream.next().await {
        let chunk = chunk.map_err(|e| FarmerError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        if buf.len() as u64 + chunk.len() as u64 > data_size {
            let mut report = shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
            report.end(now_millis(), shardnet_core::ExchangeResultCode::Failure, "FAILED_INTEGRITY");
            server.exchanges.submit(report).await;
            return Err(FarmerError::ShardExceedsContract);
        }
        hasher.update(&chunk);
        buf.extend_from_slice(&chunk);
    }

    let digest: [u8; 32] = hasher.finalize().into();
    let computed = rmd160(&digest);
    if computed != hash {
        let mut report = shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
        report.end(now_millis(), shardnet_core::ExchangeResultCode::Failure, "FAILED_INTEGRITY");
        server.exchanges.submit(report).await;
        return Err(FarmerError::FailedIntegrity);
    }

    server.storage.write_shard(&hash, &buf).await.map_err(FarmerError::Io)?;
    server.tokens.invalidate(&token).await;

    let mut report = shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
    report.end(now_millis(), shardnet_core::ExchangeResultCode::Success, "SHARD_UPLOADED");
    server.exchanges.submit(report).await;
    info!(hash = %hex::encode(hash), "shard uploaded");

    Ok(StatusCode::OK)
}

async fn retrieve(
    State(server): State<ShardServer>,
    Path(hash_hex): Path<String>,
    Query(query): Query<TransferQuery>,
) -> impl IntoResponse {
    let _guard = TransferGuard::enter(server.active_transfers.clone());
    match retrieve_inner(&server, &hash_hex, &query.token).await {
        Ok(bytes) => ([(axum::http::header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn retrieve_inner(server: &ShardServer, hash_hex: &str, token_hex: &str) -> Result<Bytes> {
    let hash = parse_hash(hash_hex)?;
    let token = parse_token(token_hex)?;
    let now = now_millis();
    let auth = server.tokens.authorize(&token, &hash, now).await?;

    if !server.storage.exists(&hash).await {
        return Err(FarmerError::ShardNotFound);
    }

    let bytes = match server.storage.read_shard(&hash).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "shard read failed");
            let mut report =
                shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
            report.end(now_millis(), shardnet_core::ExchangeResultCode::Failure, "READ_FAILED");
            server.exchanges.submit(report).await;
            return Err(FarmerError::ReadFailed);
        }
    };

    server.tokens.invalidate(&token).await;
    let mut report = shardnet_core::ExchangeReport::start(server.farmer_id, server.farmer_id, auth.client_id, hash_to_id256(&hash), now);
    report.end(now_millis(), shardnet_core::ExchangeResultCode::Success, "SHARD_DOWNLOADED");
    server.exchanges.submit(report).await;
    info!(hash = %hex::encode(hash), "shard downloaded");

    Ok(Bytes::from(bytes))
}

fn hash_to_id256(hash: &ShardHash) -> shardnet_core::Id256 {
    let mut out = [0u8; 32];
    out[..20].copy_from_slice(hash);
    out
}
