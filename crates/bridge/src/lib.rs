//! shardnet bridge client
//!
//! The HTTP client the renter side uses to talk to the bridge API: a
//! user/bucket/key/frame CRUD surface and a DHT membership layer that
//! are both explicitly out of scope for this workspace (§1). This crate
//! specifies only the request/response shapes and retry policy the
//! transfer coordinator actually consumes: request signing, frame/shard
//! registration, token acquisition, file finalization, and exchange
//! reporting (§6).

mod auth;
mod client;
mod error;
mod retry;
mod types;

pub use auth::{build_auth, new_nonce, AuthHeaders, Credentials};
pub use client::BridgeClient;
pub use error::{BridgeError, Result};
pub use retry::{with_retry, CancelHandle, DEFAULT_BRIDGE_RETRIES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_THROTTLE, FILE_ENTRY_RETRIES, FRAME_ADD_RETRIES};
pub use types::{
    ExchangeReportDto, FarmerContactDto, FileEntryRequest, FileEntryResponse, FileInfo, FrameResponse, PointerEntry,
    PointerResponse, ShardMeta, TokenGrant, TokenOperation, TokenRequest,
};
