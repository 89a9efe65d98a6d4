//! shardnet farmer shard server
//!
//! The HTTP surface a farmer runs to accept CONSIGN/RETRIEVE transfers
//! authorized by one-time tokens (§4, §5): contract admission, token
//! issuance, concurrency accounting, and expired-token reaping.

mod error;
mod exchange_sink;
mod server;
mod storage;
mod token;

pub use error::{FarmerError, Result};
pub use exchange_sink::{ExchangeSink, NullExchangeSink};
pub use server::ShardServer;
pub use storage::{FilesystemShardStorage, MemoryShardStorage, ShardStorage};
pub use token::{InMemoryTokenStore, TokenEntry, TokenOperation, TokenStore};
