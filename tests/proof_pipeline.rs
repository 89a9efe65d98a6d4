//! Audit and proof pipeline integration tests
//!
//! Covers the Merkle audit/proof protocol end to end:
//! 1. Generating an audit record from shard bytes
//! 2. Building a sibling-path proof for one challenge
//! 3. Verifying that proof against the published root
//! 4. Rejecting a proof built against the wrong shard
//! 5. Depth/padding behavior for non-power-of-two challenge counts

use shardnet_audit::{build_proof, verify, AuditError, AuditGenerator, Proof};

// ============================================================================
// 1. Generating an audit record
// ============================================================================

#[test]
fn test_generate_audit_record_for_testshard() {
    let mut generator = AuditGenerator::new(12).unwrap();
    generator.write(b"testshard");
    let (public, private) = generator.finish();

    assert_eq!(public.leaves.len(), 16, "12 challenges pad to the next power of two");
    assert_eq!(private.challenges.len(), 12);
    assert_eq!(private.depth, 5);
}

// ============================================================================
// 2 & 3. Build and verify a proof for one challenge
// ============================================================================

#[test]
fn test_build_and_verify_proof_for_challenge_one() {
    let shard = b"testshard";
    let mut generator = AuditGenerator::new(12).unwrap();
    generator.write(shard);
    let (public, private) = generator.finish();

    let challenge = private.challenges[1];
    let proof = build_proof(&public.leaves, &challenge, shard).unwrap();
    assert!(!matches!(proof, Proof::Leaf(_)), "16 leaves implies a multi-level path");

    let (computed_root, expected_root) = verify(&proof, private.root);
    assert_eq!(computed_root, expected_root);
}

#[test]
fn test_every_challenge_proves_against_the_published_root() {
    let shard = b"testshard";
    let mut generator = AuditGenerator::new(12).unwrap();
    generator.write(shard);
    let (public, private) = generator.finish();

    for challenge in &private.challenges {
        let proof = build_proof(&public.leaves, challenge, shard).unwrap();
        let (computed, expected) = verify(&proof, private.root);
        assert_eq!(computed, expected);
    }
}

// ============================================================================
// 4. Wrong shard fails proof construction
// ============================================================================

#[test]
fn test_proof_construction_fails_against_wrong_shard() {
    let mut generator = AuditGenerator::new(12).unwrap();
    generator.write(b"testshard");
    let (public, private) = generator.finish();

    let result = build_proof(&public.leaves, &private.challenges[1], b"not the original shard");
    assert!(matches!(result, Err(AuditError::ProofConstruction)));
}

#[test]
fn test_tampered_root_does_not_match() {
    let shard = b"testshard";
    let mut generator = AuditGenerator::new(12).unwrap();
    generator.write(shard);
    let (public, private) = generator.finish();

    let proof = build_proof(&public.leaves, &private.challenges[3], shard).unwrap();
    let (computed_root, _) = verify(&proof, private.root);

    let mut forged_root = private.root;
    forged_root[0] ^= 0xFF;
    assert_ne!(computed_root, forged_root);
}

// ============================================================================
// 5. Depth/padding behaviour
// ============================================================================

#[test]
fn test_single_challenge_has_depth_one() {
    let shard = b"single-leaf-shard";
    let mut generator = AuditGenerator::new(1).unwrap();
    generator.write(shard);
    let (public, private) = generator.finish();

    assert_eq!(public.leaves.len(), 1);
    assert_eq!(private.depth, 1);

    let proof = build_proof(&public.leaves, &private.challenges[0], shard).unwrap();
    assert!(matches!(proof, Proof::Leaf(_)));
    let (computed, expected) = verify(&proof, private.root);
    assert_eq!(computed, expected);
}

#[test]
fn test_streamed_shard_writes_match_a_single_write() {
    let mut streamed = AuditGenerator::new(4).unwrap();
    streamed.write(b"hello ");
    streamed.write(b"world");
    let (public_streamed, private_streamed) = streamed.finish();

    let mut single_shot = AuditGenerator::new(4).unwrap();
    // A real challenger can't reuse the streamed generator's random
    // challenges, so this only checks that chunked vs. whole-buffer
    // writes of the same bytes under the same seed produce the same
    // proof shape, not that two independent generators agree.
    single_shot.write(b"hello world");
    let (public_whole, _) = single_shot.finish();

    assert_eq!(public_streamed.leaves.len(), public_whole.leaves.len());
    for challenge in &private_streamed.challenges {
        let proof = build_proof(&public_streamed.leaves, challenge, b"hello world").unwrap();
        let (computed, expected) = verify(&proof, private_streamed.root);
        assert_eq!(computed, expected);
    }
}
