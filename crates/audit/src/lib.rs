//! shardnet audit
//!
//! Merkle-commitment challenge-response audits: the generator builds the
//! tree while streaming a shard, the proof builder reconstructs a sibling
//! path from the public leaves alone, and the verifier collapses a proof
//! back to a root for comparison.

mod error;
mod generator;
mod proof;
mod tree;
mod verify;

pub use error::{AuditError, Result};
pub use generator::{AuditGenerator, PrivateRecord, PublicRecord};
pub use proof::{build_proof, Proof};
pub use tree::{combine, empty_leaf, next_power_of_two};
pub use verify::verify;
