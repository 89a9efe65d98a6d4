//! Proof verifier
//!
//! Collapses a proof back to a root hash and leaves the comparison to the
//! caller, so both sides of a mismatch can be logged.

use crate::proof::Proof;
use crate::tree::combine;

fn leaf_hash(response: &[u8; 20]) -> [u8; 20] {
    use shardnet_crypto::{rmd160, sha256};
    rmd160(&sha256(response))
}

fn collapse(proof: &Proof) -> [u8; 20] {
    match proof {
        Proof::Leaf(response) => leaf_hash(response),
        Proof::NodeLeft(left, sibling) => combine(&collapse(left), sibling),
        Proof::NodeRight(sibling, right) => combine(sibling, &collapse(right)),
    }
}

/// Verify `proof` against `expected_root`, returning `(computed, expected)`
/// so the caller decides what a mismatch means.
pub fn verify(proof: &Proof, expected_root: [u8; 20]) -> ([u8; 20], [u8; 20]) {
    (collapse(proof), expected_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::AuditGenerator;
    use crate::proof::build_proof;

    #[test]
    fn test_verify_matches_root_for_every_challenge() {
        let shard = b"testshard";
        let mut gen = AuditGenerator::new(12).unwrap();
        gen.write(shard);
        let (public, private) = gen.finish();

        for challenge in &private.challenges {
            let proof = build_proof(&public.leaves, challenge, shard).unwrap();
            let (computed, expected) = verify(&proof, private.root);
            assert_eq!(computed, expected);
        }
    }

    #[test]
    fn test_verify_detects_tampered_shard() {
        let shard = b"testshard";
        let mut gen = AuditGenerator::new(4).unwrap();
        gen.write(shard);
        let (public, private) = gen.finish();

        let proof = build_proof(&public.leaves, &private.challenges[0], shard).unwrap();
        // Tamper with the response inside the proof.
        let tampered = match proof {
            Proof::NodeLeft(inner, sibling) => {
                let tampered_inner = match *inner {
                    Proof::Leaf(mut r) => {
                        r[0] ^= 0xFF;
                        Proof::Leaf(r)
                    }
                    other => other,
                };
                Proof::NodeLeft(Box::new(tampered_inner), sibling)
            }
            other => other,
        };

        let (computed, expected) = verify(&tampered, private.root);
        assert_ne!(computed, expected);
    }

    #[test]
    fn test_single_leaf_tree_verifies() {
        let shard = b"solo";
        let mut gen = AuditGenerator::new(1).unwrap();
        gen.write(shard);
        let (public, private) = gen.finish();

        let proof = build_proof(&public.leaves, &private.challenges[0], shard).unwrap();
        let (computed, expected) = verify(&proof, private.root);
        assert_eq!(computed, expected);
    }
}
