//! Wire DTOs for the bridge HTTP API
//!
//! The bridge itself (user/bucket/key/frame CRUD, the DHT membership
//! layer, payment settlement) is an external collaborator out of scope
//! for this workspace; these types are only the shapes the coordinator
//! sends and receives on the endpoints it actually calls.

use serde::{Deserialize, Serialize};

use shardnet_core::{ExchangeReport, ExchangeResultCode, FarmerContact};

/// One shard's metadata, registered against a frame via `PUT
/// /frames/{id}` once its audit record has been generated.
#[derive(Debug, Clone, Serialize)]
pub struct ShardMeta {
    pub hash: String,
    pub size: u64,
    pub index: u32,
    pub challenges: Vec<String>,
    pub tree: Vec<String>,
    /// Farmer node IDs to exclude from selection (the blacklist).
    pub exclude: Vec<String>,
}

/// The bridge's response to a successful frame shard registration: a
/// resolved farmer contact plus a one-time transfer token.
#[derive(Debug, Clone, Deserialize)]
pub struct PointerResponse {
    pub farmer: FarmerContactDto,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FarmerContactDto {
    pub address: String,
    pub port: u16,
    pub node_id: String,
}

impl FarmerContactDto {
    pub fn into_contact(self) -> Option<FarmerContact> {
        let node_id = hex::decode(&self.node_id).ok()?;
        let node_id: [u8; 32] = node_id.try_into().ok()?;
        Some(FarmerContact { address: self.address, port: self.port, node_id })
    }
}

/// `POST /buckets/{id}/tokens` request body.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum TokenOperation {
    #[serde(rename = "PUSH")]
    Push,
    #[serde(rename = "PULL")]
    Pull,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub operation: TokenOperation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub token: String,
}

/// `GET /buckets/{id}/files/{file}/info` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub filename: String,
    pub mimetype: String,
    pub size: u64,
    pub shards: u32,
}

/// One entry of a pointer slice (`GET /buckets/{id}/files/{file}`), a
/// sliding window of resolved shard locations used while downloading.
#[derive(Debug, Clone, Deserialize)]
pub struct PointerEntry {
    pub farmer: FarmerContactDto,
    pub hash: String,
    pub token: String,
    pub size: u64,
}

/// `POST /buckets/{id}/files` — finalize a file after every shard has
/// uploaded successfully.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntryRequest {
    pub frame: String,
    pub filename: String,
    pub mimetype: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntryResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameResponse {
    pub id: String,
}

/// The wire shape of an exchange report, matching §6 of the spec
/// exactly: the numeric result code, not the Rust enum's variant name.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReportDto {
    pub data_hash: String,
    pub reporter_id: String,
    pub client_id: String,
    pub farmer_id: String,
    pub exchange_start: i64,
    pub exchange_end: Option<i64>,
    pub exchange_result_code: Option<u16>,
    pub exchange_result_message: Option<String>,
}

impl From<&ExchangeReport> for ExchangeReportDto {
    fn from(report: &ExchangeReport) -> Self {
        Self {
            data_hash: hex::encode(report.data_hash),
            reporter_id: hex::encode(report.reporter_id),
            client_id: hex::encode(report.client_id),
            farmer_id: hex::encode(report.farmer_id),
            exchange_start: report.exchange_start,
            exchange_end: report.exchange_end,
            exchange_result_code: report.exchange_result_code.map(code_to_u16),
            exchange_result_message: report.exchange_result_message.clone(),
        }
    }
}

fn code_to_u16(code: ExchangeResultCode) -> u16 {
    code as u16
}
