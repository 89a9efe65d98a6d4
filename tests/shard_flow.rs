//! Shard demux/mux and farmer transfer integration tests
//!
//! Covers:
//! 1. Splitting a file into fixed-size shards and reassembling it
//! 2. The adaptive shard-size policy for larger files
//! 3. A full CONSIGN then RETRIEVE round trip against a live farmer server
//! 4. The farmer rejecting an oversized or hash-mismatched shard
//! 5. Concurrency accounting gating new contract acceptance

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shardnet_bridge::{BridgeClient, Credentials};
use shardnet_farmer::{InMemoryTokenStore, MemoryShardStorage, ShardServer, ShardStorage, TokenOperation, TokenStore};
use shardnet_shardio::{get_optimal_shard_size, BufferedSource, ShardDemuxer, ShardMuxer};

// ============================================================================
// 1. Demux then mux round trip
// ============================================================================

#[test]
fn test_demux_seventy_one_byte_file_into_four_shards() {
    let data: Vec<u8> = (0u8..71).collect();
    let demux = ShardDemuxer::new(Cursor::new(data.clone()), 18, data.len() as u64).unwrap();

    let shards: Vec<Vec<u8>> = demux.collect::<std::io::Result<Vec<_>>>().unwrap();
    assert_eq!(shards.iter().map(|s| s.len()).collect::<Vec<_>>(), vec![18, 18, 18, 17]);
    assert_eq!(shards.concat(), data);
}

#[tokio::test]
async fn test_mux_reassembles_demuxed_shards_in_order() {
    let data: Vec<u8> = (0u8..71).collect();
    let demux = ShardDemuxer::new(Cursor::new(data.clone()), 18, data.len() as u64).unwrap();
    let shards: Vec<Vec<u8>> = demux.collect::<std::io::Result<Vec<_>>>().unwrap();

    let (muxer, handle) = ShardMuxer::new(shards.len(), data.len() as u64);
    for shard in &shards {
        let hash = shardnet_crypto::rmd160_sha256(shard);
        handle.add_input_source(hash, Box::new(BufferedSource::new(shard.clone()))).unwrap();
    }

    let reassembled = muxer.read_all().await.unwrap();
    assert_eq!(reassembled.as_ref(), data.as_slice());
}

// ============================================================================
// 2. Adaptive shard-size policy
// ============================================================================

#[test]
fn test_optimal_shard_size_keeps_small_files_in_one_shard() {
    let size = get_optimal_shard_size(71, 3);
    assert_eq!(size, 8 * 1024 * 1024);
}

#[test]
fn test_optimal_shard_size_splits_large_files_under_memory_budget() {
    let thirty_two_mib = 32 * 1024 * 1024;
    let size = get_optimal_shard_size(thirty_two_mib, 4);
    assert!(size <= thirty_two_mib);
    assert!(thirty_two_mib.div_ceil(size) >= 1);
}

// ============================================================================
// 3 & 4. Live farmer server round trip
// ============================================================================

async fn spawn_farmer(server: ShardServer) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server.router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_consign_then_retrieve_round_trip_over_http() {
    let storage: Arc<dyn ShardStorage> = Arc::new(MemoryShardStorage::new(10 * 1024 * 1024 * 1024));
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let server = ShardServer::new(storage, tokens, [9u8; 32]);

    let shard = b"a shard's worth of bytes";
    let hash = shardnet_crypto::rmd160_sha256(shard);
    server.admit_contract(hash, shard.len() as u64);
    let consign_token = shardnet_core::Token::generate();
    server.issue_token(consign_token, hash, [1u8; 32], TokenOperation::Consign, Duration::from_secs(60));
    tokio::task::yield_now().await;

    let addr = spawn_farmer(server.clone()).await;
    let bridge = BridgeClient::new(format!("http://{addr}"), Credentials::basic("renter@example.com", "pw"));

    bridge.upload_shard(&format!("http://{addr}"), &hash, &consign_token.to_hex(), bytes::Bytes::from(shard.to_vec())).await.unwrap();

    let retrieve_token = shardnet_core::Token::generate();
    server.issue_token(retrieve_token, hash, [1u8; 32], TokenOperation::Retrieve, Duration::from_secs(60));
    tokio::task::yield_now().await;

    let downloaded = bridge.download_shard(&format!("http://{addr}"), &hash, &retrieve_token.to_hex()).await.unwrap();
    assert_eq!(downloaded.as_ref(), &shard[..]);
}

#[tokio::test]
async fn test_consign_rejects_shard_exceeding_contract_size() {
    let storage: Arc<dyn ShardStorage> = Arc::new(MemoryShardStorage::new(10 * 1024 * 1024 * 1024));
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let server = ShardServer::new(storage, tokens, [9u8; 32]);

    let hash = shardnet_crypto::rmd160_sha256(b"tiny");
    server.admit_contract(hash, 2);
    let token = shardnet_core::Token::generate();
    server.issue_token(token, hash, [1u8; 32], TokenOperation::Consign, Duration::from_secs(60));
    tokio::task::yield_now().await;

    let addr = spawn_farmer(server).await;
    let bridge = BridgeClient::new(format!("http://{addr}"), Credentials::basic("renter@example.com", "pw"));
    let result = bridge.upload_shard(&format!("http://{addr}"), &hash, &token.to_hex(), bytes::Bytes::from_static(b"way too many bytes")).await;
    assert!(result.is_err());
}

// ============================================================================
// 5. Concurrency accounting
// ============================================================================

#[test]
fn test_backoff_limit_of_zero_rejects_new_contracts_immediately() {
    let storage: Arc<dyn ShardStorage> = Arc::new(MemoryShardStorage::new(1024));
    let tokens: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let server = ShardServer::new(storage, tokens, [4u8; 32]).with_offer_backoff_limit(0);
    assert!(!server.accepts_new_contracts());
}
