//! Upload coordinator
//!
//! Drives one file's upload: demux into shards, hash + audit each one,
//! register it with the bridge to obtain a farmer pointer, transfer it
//! with retry and blacklisting, report the outcome, and finalize once
//! every shard has completed (§4.7).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use shardnet_bridge::{BridgeClient, CancelHandle, ExchangeReportDto, FileEntryRequest, ShardMeta};
use shardnet_core::{ExchangeReport, ExchangeResultCode, Id256, PublicKey, ShardHash};
use shardnet_shardio::{get_optimal_shard_size, ShardDemuxer};

use crate::blacklist::Blacklist;
use crate::error::{RenterError, Result};
use crate::transfer::TransferMachine;

pub const DEFAULT_TRANSFER_CONCURRENCY: usize = 3;
pub const DEFAULT_TRANSFER_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_THROTTLE: Duration = Duration::from_millis(500);
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_AUDIT_COUNT: usize = 12;
/// Bounds how many times a shard will cycle through "exhaust retries,
/// blacklist, get a new pointer" before the upload gives up entirely;
/// the spec leaves this open-ended, a production deployment needs a
/// ceiling to avoid an upload hanging forever against an exhausted
/// farmer pool.
pub const MAX_POINTER_ACQUISITIONS: u32 = 10;

#[derive(Clone)]
pub struct UploadConfig {
    pub transfer_concurrency: usize,
    pub transfer_retries: u32,
    pub retry_throttle: Duration,
    pub token_ttl: Duration,
    pub audit_count: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            transfer_concurrency: DEFAULT_TRANSFER_CONCURRENCY,
            transfer_retries: DEFAULT_TRANSFER_RETRIES,
            retry_throttle: DEFAULT_RETRY_THROTTLE,
            token_ttl: DEFAULT_TOKEN_TTL,
            audit_count: DEFAULT_AUDIT_COUNT,
        }
    }
}

/// Shared, mutated-only-by-the-worker state for one file's upload
/// (§3 Upload state): completed count, cleanup queue, and the kill flag
/// that propagates cancellation to every in-flight shard.
struct UploadState {
    num_shards: u64,
    completed: AtomicU64,
    temp_files: Mutex<Vec<PathBuf>>,
    killed: AtomicBool,
}

impl UploadState {
    fn new(num_shards: u64) -> Self {
        Self { num_shards, completed: AtomicU64::new(0), temp_files: Mutex::new(Vec::new()), killed: AtomicBool::new(false) }
    }

    fn is_complete(&self) -> bool {
        self.completed.load(Ordering::SeqCst) >= self.num_shards
    }

    fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

pub struct UploadCoordinator {
    bridge: BridgeClient,
    renter_id: PublicKey,
    blacklist: Arc<Blacklist>,
    config: UploadConfig,
}

pub struct UploadOutcome {
    pub file_id: String,
    pub shards_uploaded: u64,
}

impl UploadCoordinator {
    pub fn new(bridge: BridgeClient, renter_id: PublicKey, blacklist: Arc<Blacklist>, config: UploadConfig) -> Self {
        Self { bridge, renter_id, blacklist, config }
    }

    /// Upload `path` into `bucket_id`, splitting it into shards with the
    /// adaptive shard-size policy, transferring each concurrently up to
    /// `transfer_concurrency`, and finalizing a file entry once every
    /// shard has uploaded. `cancel` kills the whole upload: closes every
    /// active uploader and aborts any in-flight bridge request.
    pub async fn store_file(&self, bucket_id: &str, path: &Path, cancel: CancelHandle) -> Result<UploadOutcome> {
        let file_size = tokio::fs::metadata(path).await?.len();
        let shard_size = get_optimal_shard_size(file_size, self.config.transfer_concurrency as u32);

        let shard_count = {
            let file = std::fs::File::open(path)?;
            let demux = ShardDemuxer::new(file, shard_size, file_size)?;
            demux.shard_count()
        };

        let frame = self.bridge.create_frame().await?;
        let state = Arc::new(UploadState::new(shard_count));
        let semaphore = Arc::new(Semaphore::new(self.config.transfer_concurrency));

        let file = std::fs::File::open(path)?;
        let demux = ShardDemuxer::new(file, shard_size, file_size)?;

        let mut handles = Vec::new();
        for (index, shard) in demux.enumerate() {
            let shard = shard?;
            if state.is_killed() || cancel.is_cancelled() {
                break;
            }
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed during upload");
            let coordinator = self.clone_inner();
            let state = state.clone();
            let frame_id = frame.id.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                coordinator.upload_shard(&frame_id, index as u32, shard, &state, &cancel).await
            }));
        }

        for handle in handles {
            handle.await.expect("upload worker task panicked")?;
        }

        if cancel.is_cancelled() || state.is_killed() {
            self.cleanup_temp_files(&state).await;
            return Err(RenterError::Cancelled);
        }

        self.cleanup_temp_files(&state).await;

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("shard").to_string();
        let mimetype = mime_from_extension(path);
        let entry = self
            .bridge
            .create_file_entry(bucket_id, &FileEntryRequest { frame: frame.id.clone(), filename, mimetype }, &cancel)
            .await?;

        Ok(UploadOutcome { file_id: entry.id, shards_uploaded: state.completed.load(Ordering::SeqCst) })
    }

    fn clone_inner(&self) -> Self {
        Self { bridge: self.bridge.clone(), renter_id: self.renter_id, blacklist: self.blacklist.clone(), config: self.config.clone() }
    }

    async fn upload_shard(
        &self,
        frame_id: &str,
        index: u32,
        shard: Vec<u8>,
        state: &Arc<UploadState>,
        cancel: &CancelHandle,
    ) -> Result<()> {
        let temp_path = self.write_temp_file(&shard).await?;
        state.temp_files.lock().expect("upload state poisoned").push(temp_path.clone());

        let hash = shardnet_crypto::rmd160_sha256(&shard);

        let mut generator = shardnet_audit::AuditGenerator::new(self.config.audit_count)?;
        generator.write(&shard);
        let (public, private) = generator.finish();

        let meta = ShardMeta {
            hash: hex::encode(hash),
            size: shard.len() as u64,
            index,
            challenges: private.challenges.iter().map(hex::encode).collect(),
            tree: public.leaves.iter().map(hex::encode).collect(),
            exclude: self.blacklist.snapshot(now_millis()).iter().map(hex::encode).collect(),
        };

        let mut pointer_acquisitions = 0u32;
        loop {
            if cancel.is_cancelled() || state.is_killed() {
                return Err(RenterError::Cancelled);
            }
            pointer_acquisitions += 1;
            if pointer_acquisitions > MAX_POINTER_ACQUISITIONS {
                return Err(RenterError::TransferFailed {
                    farmer: "<exhausted>".into(),
                    reason: "no farmer accepted the shard after exhausting the pointer budget".into(),
                });
            }

            let mut meta = meta.clone();
            meta.exclude = self.blacklist.snapshot(now_millis()).iter().map(hex::encode).collect();
            let pointer = self.bridge.register_shard(frame_id, &meta, cancel).await?;
            let Some(contact) = pointer.farmer.clone().into_contact() else {
                return Err(RenterError::BadFarmerContact);
            };
            let farmer_base_url = contact.base_url();

            let mut machine = TransferMachine::new(self.config.transfer_retries);
            let report_start = now_millis();
            loop {
                machine.start_attempt();
                let bytes = bytes::Bytes::from(shard.clone());
                match self.bridge.upload_shard(&farmer_base_url, &hash, &pointer.token, bytes).await {
                    Ok(()) => {
                        machine.succeed();
                        self.submit_report(contact.node_id, hash, report_start, ExchangeResultCode::Success, "SHARD_UPLOADED")
                            .await;
                        state.completed.fetch_add(1, Ordering::SeqCst);
                        info!(shard = %hex::encode(hash), index, "shard uploaded");
                        return Ok(());
                    }
                    Err(err) => {
                        warn!(shard = %hex::encode(hash), farmer = %contact.address, error = %err, "shard transfer failed");
                        if !machine.fail_attempt(err.to_string()) {
                            break;
                        }
                        tokio::time::sleep(self.config.retry_throttle).await;
                    }
                }
            }

            // Retries exhausted against this farmer: blacklist it,
            // report the failure, and loop back for a fresh pointer.
            self.blacklist.add(contact.node_id, now_millis());
            self.submit_report(contact.node_id, hash, report_start, ExchangeResultCode::Failure, "TRANSFER_FAILED").await;
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

    async fn write_temp_file(&self, shard: &[u8]) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("shardnet-upload-{}-{}", std::process::id(), uuid_like()));
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(shard).await?;
        Ok(path)
    }

    async fn cleanup_temp_files(&self, state: &UploadState) {
        let files: Vec<PathBuf> = std::mem::take(&mut state.temp_files.lock().expect("upload state poisoned"));
        for path in files {
            let _ = tokio::fs::remove_file(path).await;
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

fn uuid_like() -> String {
    hex::encode(shardnet_crypto::random_32())
}

fn mime_from_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
    .to_string()
}
