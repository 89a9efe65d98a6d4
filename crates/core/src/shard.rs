//! Shard identity
//!
//! A shard is an opaque, bounded-size byte sequence. It is identified by
//! the double hash `rmd160(sha256(bytes))` — the canonical leaf hash used
//! throughout the audit, transfer, and storage subsystems. The composition
//! itself lives in `shardnet_crypto::rmd160_sha256`; this is just its
//! output type.

use crate::Id160;

/// A shard's content hash: `rmd160(sha256(bytes))`.
pub type ShardHash = Id160;
