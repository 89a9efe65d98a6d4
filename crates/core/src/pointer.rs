//! Pointer — everything a renter needs to transfer one shard
//!
//! A pointer resolves one shard to a concrete farmer location plus the
//! one-time token authorizing the transfer.

use serde::{Deserialize, Serialize};

use crate::{token::Token, PublicKey, ShardHash};

/// Network contact information for a farmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerContact {
    pub address: String,
    pub port: u16,
    pub node_id: PublicKey,
}

impl FarmerContact {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// One resolved location for one shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pointer {
    pub farmer: FarmerContact,
    pub shard_hash: ShardHash,
    pub token: Token,
}
