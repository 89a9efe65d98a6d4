//! Audit generator
//!
//! Streams a shard's bytes through `auditCount` independent incremental
//! hashers, one per random challenge, and on completion yields the bottom
//! Merkle leaves plus the tree root/depth/challenge list.

use sha2::{Digest, Sha256};

use shardnet_crypto::{random_32, rmd160, sha256};

use crate::error::{AuditError, Result};
use crate::tree::{build_root, empty_leaf, next_power_of_two};

/// The public half of an audit record: the padded bottom leaves, shared
/// with whoever must build proofs against this tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicRecord {
    pub leaves: Vec<[u8; 20]>,
}

/// The private half: root, depth, and the challenges that produced the
/// real (non-padding) leaves. Kept by the party that issues challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateRecord {
    pub root: [u8; 20],
    pub depth: u32,
    pub challenges: Vec<[u8; 32]>,
}

/// Consumes shard bytes incrementally and produces an audit record.
pub struct AuditGenerator {
    challenges: Vec<[u8; 32]>,
    hashers: Vec<Sha256>,
}

impl AuditGenerator {
    /// Generate `audit_count` random challenges and start one hasher per
    /// challenge, each seeded with its challenge bytes.
    pub fn new(audit_count: usize) -> Result<Self> {
        if audit_count == 0 {
            return Err(AuditError::EmptyChallengeSet);
        }
        let challenges: Vec<[u8; 32]> = (0..audit_count).map(|_| random_32()).collect();
        let hashers = challenges
            .iter()
            .map(|c| {
                let mut h = Sha256::new();
                h.update(c);
                h
            })
            .collect();
        Ok(Self { challenges, hashers })
    }

    /// Feed one chunk of shard bytes to every active hasher. Chunks are
    /// hex-encoded before hashing so the running digest matches the
    /// single-shot computation a proof builder performs over the whole
    /// shard.
    pub fn write(&mut self, chunk: &[u8]) {
        let hex_chunk = hex::encode(chunk);
        for hasher in &mut self.hashers {
            hasher.update(hex_chunk.as_bytes());
        }
    }

    /// Finish streaming and build the Merkle tree over the resulting
    /// leaves, padded up to the next power of two.
    pub fn finish(self) -> (PublicRecord, PrivateRecord) {
        let audit_count = self.challenges.len();
        let padded_len = next_power_of_two(audit_count);

        let mut leaves: Vec<[u8; 20]> = self
            .hashers
            .into_iter()
            .map(|h| {
                let digest: [u8; 32] = h.finalize().into();
                rmd160(&sha256(&rmd160(&digest)))
            })
            .collect();
        leaves.resize(padded_len, empty_leaf());

        let (root, depth) = build_root(&leaves);

        (
            PublicRecord { leaves },
            PrivateRecord {
                root,
                depth,
                challenges: self.challenges,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_count_is_padded() {
        let mut gen = AuditGenerator::new(12).unwrap();
        gen.write(b"testshard");
        let (public, private) = gen.finish();
        assert_eq!(public.leaves.len(), 16);
        assert_eq!(private.challenges.len(), 12);
        assert_eq!(private.depth, 5);
    }

    #[test]
    fn test_single_challenge_tree() {
        let mut gen = AuditGenerator::new(1).unwrap();
        gen.write(b"x");
        let (public, private) = gen.finish();
        assert_eq!(public.leaves.len(), 1);
        assert_eq!(private.depth, 1);
    }

    #[test]
    fn test_zero_audit_count_rejected() {
        assert!(matches!(AuditGenerator::new(0), Err(AuditError::EmptyChallengeSet)));
    }

    #[test]
    fn test_streamed_chunks_match_single_write() {
        let mut streamed = AuditGenerator::new(4).unwrap();
        streamed.write(b"hello ");
        streamed.write(b"world");

        // Re-derive the same challenges for a single-shot comparison run
        // by constructing the hashers manually with the same seeds.
        let challenges = streamed.challenges.clone();
        let mut combined_hashers: Vec<Sha256> = challenges
            .iter()
            .map(|c| {
                let mut h = Sha256::new();
                h.update(c);
                h.update(hex::encode(b"hello world").as_bytes());
                h
            })
            .collect();

        let (public, _) = streamed.finish();
        let expected: Vec<[u8; 20]> = combined_hashers
            .drain(..)
            .map(|h| {
                let digest: [u8; 32] = h.finalize().into();
                rmd160(&sha256(&rmd160(&digest)))
            })
            .collect();
        assert_eq!(&public.leaves[..expected.len()], &expected[..]);
    }
}
