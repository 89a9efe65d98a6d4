//! Download coordinator
//!
//! Resolves a file's shard pointers in sliding windows, fetches each
//! shard from its farmer with per-shard retry and blacklisting, then
//! hands the resolved bytes to a `ShardMuxer` per slice, which
//! re-verifies each source against its declared hash and assembles the
//! slice into the destination file in pointer order (§4.7 download).

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};

use shardnet_bridge::{BridgeClient, CancelHandle, ExchangeReportDto, PointerEntry, TokenOperation};
use shardnet_core::{ExchangeReport, ExchangeResultCode, Id256, PublicKey, ShardHash};
use shardnet_shardio::{BufferedSource, ShardMuxer};

use crate::blacklist::Blacklist;
use crate::error::{RenterError, Result};
use crate::transfer::TransferMachine;

pub const DEFAULT_POINTER_WINDOW: u32 = 6;
pub const DEFAULT_TRANSFER_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_THROTTLE: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct DownloadConfig {
    pub pointer_window: u32,
    pub transfer_retries: u32,
    pub retry_throttle: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { pointer_window: DEFAULT_POINTER_WINDOW, transfer_retries: DEFAULT_TRANSFER_RETRIES, retry_throttle: DEFAULT_RETRY_THROTTLE }
    }
}

pub struct DownloadCoordinator {
    bridge: BridgeClient,
    renter_id: PublicKey,
    blacklist: Arc<Blacklist>,
    config: DownloadConfig,
}

pub struct DownloadOutcome {
    pub bytes_written: u64,
    pub shard_count: u32,
}

impl DownloadCoordinator {
    pub fn new(bridge: BridgeClient, renter_id: PublicKey, blacklist: Arc<Blacklist>, config: DownloadConfig) -> Self {
        Self { bridge, renter_id, blacklist, config }
    }

    /// Fetch `bucket_id`/`file_id` into `dest`, overwriting it.
    pub async fn fetch_file(&self, bucket_id: &str, file_id: &str, dest: &Path, cancel: CancelHandle) -> Result<DownloadOutcome> {
        let info = self.bridge.get_file_info(bucket_id, file_id).await?;
        // Acquired to authorize the pointer-slice reads that follow; the
        // bridge itself resolves per-shard tokens via PointerEntry.
        let _ = self.bridge.request_token(bucket_id, TokenOperation::Pull).await?;

        let mut out = tokio::fs::File::create(dest).await?;
        let mut skip = 0u32;
        let mut received: u32 = 0;
        let mut bytes_written = 0u64;

        loop {
            if cancel.is_cancelled() {
                return Err(RenterError::Cancelled);
            }
            if received >= info.shards {
                break;
            }
            let slice = self.bridge.get_pointer_slice(bucket_id, file_id, skip, self.config.pointer_window).await?;
            if slice.is_empty() {
                return Err(RenterError::PointerSliceExhausted);
            }

            let slice_len: u64 = slice.iter().map(|entry| entry.size).sum();
            let (muxer, handle) = ShardMuxer::new(slice.len(), slice_len);

            let mut fetches = Vec::with_capacity(slice.len());
            for entry in &slice {
                fetches.push(self.fetch_shard(entry.clone(), &cancel));
            }
            let results = futures::future::join_all(fetches).await;

            for (entry, result) in slice.iter().zip(results) {
                let bytes = result?;
                let hash_bytes = hex::decode(&entry.hash).map_err(|_| RenterError::BadFarmerContact)?;
                let hash: ShardHash = hash_bytes.try_into().map_err(|_| RenterError::BadFarmerContact)?;
                handle.add_input_source(hash, Box::new(BufferedSource::new(bytes)))?;
            }

            let assembled = muxer.read_all().await?;
            out.seek(std::io::SeekFrom::Start(bytes_written)).await?;
            out.write_all(&assembled).await?;
            bytes_written += assembled.len() as u64;
            received += slice.len() as u32;

            skip += slice.len() as u32;
        }

        out.flush().await?;
        info!(file_id, bytes_written, "file downloaded");
        Ok(DownloadOutcome { bytes_written, shard_count: received })
    }

    async fn fetch_shard(&self, entry: PointerEntry, cancel: &CancelHandle) -> Result<bytes::Bytes> {
        let hash_bytes = hex::decode(&entry.hash).map_err(|_| RenterError::BadFarmerContact)?;
        let hash: ShardHash = hash_bytes.try_into().map_err(|_| RenterError::BadFarmerContact)?;

        let mut entry = entry;
        loop {
            if cancel.is_cancelled() {
                return Err(RenterError::Cancelled);
            }
            let Some(contact) = entry.farmer.clone().into_contact() else {
                return Err(RenterError::BadFarmerContact);
            };
            let farmer_base_url = contact.base_url();

            let mut machine = TransferMachine::new(self.config.transfer_retries);
            let report_start = now_millis();
            loop {
                machine.start_attempt();
                match self.bridge.download_shard(&farmer_base_url, &hash, &entry.token).await {
                    Ok(bytes) if shardnet_crypto::rmd160_sha256(&bytes) == hash => {
                        machine.succeed();
                        self.submit_report(contact.node_id, hash, report_start, ExchangeResultCode::Success, "SHARD_DOWNLOADED").await;
                        return Ok(bytes);
                    }
                    Ok(_) => {
                        warn!(shard = %entry.hash, farmer = %contact.address, "downloaded shard failed integrity check");
                        self.submit_report(contact.node_id, hash, report_start, ExchangeResultCode::Failure, "FAILED_INTEGRITY").await;
                        self.blacklist.add(contact.node_id, now_millis());
                        break;
                    }
                    Err(err) => {
                        warn!(shard = %entry.hash, farmer = %contact.address, error = %err, "shard download failed");
                        if !machine.fail_attempt(err.to_string()) {
                            self.submit_report(contact.node_id, hash, report_start, ExchangeResultCode::Failure, "TRANSFER_FAILED").await;
                            self.blacklist.add(contact.node_id, now_millis());
                            break;
                        }
                        tokio::time::sleep(self.config.retry_throttle).await;
                    }
                }
            }

            // This farmer is now blacklisted; the bridge resolves pointer
            // slices without excluded farmers on a fresh request (the
            // exclude list travels with registration, not retrieval), so
            // retrying means asking the same pointer's `token` again is
            // pointless. Surface a hard failure: a real deployment would
            // re-request the slice so the bridge can route around the
            // farmer it just blacklisted.
            return Err(RenterError::TransferFailed { farmer: contact.address, reason: "shard unavailable from resolved farmer".into() });
        }
    }

    async fn submit_report(&self, farmer_id: PublicKey, hash: ShardHash, start: i64, code: ExchangeResultCode, message: &str) {
        let mut report = ExchangeReport::start(self.renter_id, farmer_id, self.renter_id, hash_to_id256(&hash), start);
        report.end(now_millis(), code, message);
        let dto = ExchangeReportDto::from(&report);
        if let Err(err) = self.bridge.submit_exchange_report(&dto).await {
            warn!(error = %err, "failed to submit exchange report");
        }
    }
}

fn hash_to_id256(hash: &ShardHash) -> Id256 {
    let mut out = [0u8; 32];
    out[..20].copy_from_slice(hash);
    out
}

fn now_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}
