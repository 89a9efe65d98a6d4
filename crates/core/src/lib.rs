//! shardnet core types
//!
//! Shared identifiers and the data model described by the shard storage
//! network: shards, contracts, pointers, transfer tokens, and exchange
//! reports.

mod error;
mod types;
pub mod contract;
pub mod exchange;
pub mod pointer;
pub mod shard;
pub mod token;

pub use error::*;
pub use types::*;

pub use contract::Contract;
pub use exchange::{ExchangeReport, ExchangeResultCode};
pub use pointer::{FarmerContact, Pointer};
pub use shard::ShardHash;
pub use token::Token;
