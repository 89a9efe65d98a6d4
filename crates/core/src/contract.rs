//! Storage contract
//!
//! A contract binds one renter identity to one farmer identity for the
//! storage of one shard. `shard.size <= dataSize` is an invariant enforced
//! at every point a contract is consulted (farmer admission, audit sizing).

use serde::{Deserialize, Serialize};

use crate::{Id256, PublicKey, Signature};

/// A renter/farmer storage agreement for one shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Hash of the shard this contract covers.
    pub data_hash: Id256,
    /// Declared size of the shard in bytes.
    pub data_size: u64,
    /// Unix timestamp (seconds) the storage term begins.
    pub store_begin: i64,
    /// Unix timestamp (seconds) the storage term ends.
    pub store_end: i64,
    /// Number of audit challenges the farmer must be able to answer.
    pub audit_count: u32,
    /// Renter's identity public key.
    pub renter_id: PublicKey,
    /// Farmer's identity public key.
    pub farmer_id: PublicKey,
    /// Renter's signature over the contract body.
    pub renter_signature: Option<Signature>,
    /// Farmer's signature over the contract body.
    pub farmer_signature: Option<Signature>,
}

impl Contract {
    /// A contract is complete once every required field and both
    /// signatures are present. Only complete contracts may be stored or
    /// acted on (offer admission, shard server issuance).
    pub fn is_complete(&self) -> bool {
        self.data_size > 0
            && self.store_end > self.store_begin
            && self.audit_count > 0
            && self.renter_signature.is_some()
            && self.farmer_signature.is_some()
    }

    /// Check the size invariant against an actual shard byte length.
    pub fn shard_fits(&self, shard_len: u64) -> bool {
        shard_len <= self.data_size
    }

    /// The canonical byte sequence a party signs when agreeing to this
    /// contract. Both renter and farmer sign this same sequence; their
    /// signatures are stored separately on the contract.
    pub fn signable_data(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 8 + 8 + 8 + 4 + 32 + 32);
        buf.extend_from_slice(&self.data_hash);
        buf.extend_from_slice(&self.data_size.to_be_bytes());
        buf.extend_from_slice(&self.store_begin.to_be_bytes());
        buf.extend_from_slice(&self.store_end.to_be_bytes());
        buf.extend_from_slice(&self.audit_count.to_be_bytes());
        buf.extend_from_slice(&self.renter_id);
        buf.extend_from_slice(&self.farmer_id);
        buf
    }
}
