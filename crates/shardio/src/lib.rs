//! shardnet shard I/O
//!
//! The demultiplexer splits a local file into fixed-size shard streams;
//! the multiplexer re-assembles ordered remote shard streams back into a
//! contiguous byte output with per-shard integrity checking.

mod demux;
mod error;
mod mux;

pub use demux::{get_optimal_shard_size, ShardDemuxer};
pub use error::{Result, ShardIoError};
pub use mux::{BufferedSource, MuxerHandle, ShardMuxer, ShardSource};
