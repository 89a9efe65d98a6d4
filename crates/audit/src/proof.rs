//! Proof builder
//!
//! Builds the sibling-path proof from the bottom leaves of an audit tree
//! for one challenge, without needing the private record.

use shardnet_crypto::{rmd160, sha256};

use crate::error::{AuditError, Result};

/// A stream-oriented nested-pair proof. The bottom of the structure is
/// the raw challenge response; every level above pairs the running hash
/// with a sibling digest, hex-concatenated before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proof {
    /// The challenge response at the matching leaf position.
    Leaf([u8; 20]),
    /// Recurse down the left side, sibling digest on the right.
    NodeLeft(Box<Proof>, [u8; 20]),
    /// Sibling digest on the left, recurse down the right side.
    NodeRight([u8; 20], Box<Proof>),
}

fn challenge_response(challenge: &[u8; 32], shard: &[u8]) -> [u8; 20] {
    let mut buf = Vec::with_capacity(32 + shard.len() * 2);
    buf.extend_from_slice(challenge);
    buf.extend_from_slice(hex::encode(shard).as_bytes());
    rmd160(&sha256(&buf))
}

fn leaf_hash(response: &[u8; 20]) -> [u8; 20] {
    rmd160(&sha256(response))
}

/// Build a proof for `challenge` against `shard`, locating the matching
/// leaf among `leaves` (the padded bottom row of an audit tree).
pub fn build_proof(leaves: &[[u8; 20]], challenge: &[u8; 32], shard: &[u8]) -> Result<Proof> {
    let response = challenge_response(challenge, shard);
    let search_key = leaf_hash(&response);

    let mut index = leaves
        .iter()
        .position(|leaf| leaf == &search_key)
        .ok_or(AuditError::ProofConstruction)?;

    let mut proof = Proof::Leaf(response);
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        if index % 2 == 0 {
            let sibling = level[index + 1];
            proof = Proof::NodeLeft(Box::new(proof), sibling);
        } else {
            let sibling = level[index - 1];
            proof = Proof::NodeRight(sibling, Box::new(proof));
        }

        let mut next = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            next.push(crate::tree::combine(&pair[0], &pair[1]));
        }
        level = next;
        index /= 2;
    }

    Ok(proof)
}
