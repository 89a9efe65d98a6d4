//! Property-based tests for the invariants in spec §8
//!
//! Unlike `proof_pipeline.rs` and `shard_flow.rs`, which check fixed
//! worked examples, these generate random inputs to check that the
//! stated invariants hold broadly rather than just for one shard.

use std::io::Cursor;
use std::time::Duration;

use proptest::prelude::*;

use shardnet_audit::{build_proof, next_power_of_two, verify, AuditGenerator};
use shardnet_renter::Blacklist;
use shardnet_shardio::ShardDemuxer;

proptest! {
    /// Every challenge in an audit record proves against the published
    /// root, for arbitrary shard bytes and arbitrary audit counts.
    #[test]
    fn proof_round_trip_holds_for_any_shard(
        shard in prop::collection::vec(any::<u8>(), 1..512),
        audit_count in 1usize..20,
    ) {
        let mut generator = AuditGenerator::new(audit_count).unwrap();
        generator.write(&shard);
        let (public, private) = generator.finish();

        prop_assert_eq!(public.leaves.len(), next_power_of_two(audit_count));

        for challenge in &private.challenges {
            let proof = build_proof(&public.leaves, challenge, &shard).unwrap();
            let (computed, expected) = verify(&proof, private.root);
            prop_assert_eq!(computed, expected);
        }
    }

    /// The public record always has exactly `nextPowerOfTwo(auditCount)`
    /// leaves.
    #[test]
    fn public_record_length_is_next_power_of_two(audit_count in 1usize..64) {
        let generator = AuditGenerator::new(audit_count).unwrap();
        let (public, _) = generator.finish();
        prop_assert_eq!(public.leaves.len(), next_power_of_two(audit_count));
    }

    /// Demuxing then concatenating shards in order always reproduces the
    /// source bytes, for arbitrary file sizes and shard sizes.
    #[test]
    fn demux_concatenation_matches_source(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        shard_size in 1u64..512,
    ) {
        let total = data.len() as u64;
        let demux = ShardDemuxer::new(Cursor::new(data.clone()), shard_size, total).unwrap();
        let shards: Vec<Vec<u8>> = demux.collect::<std::io::Result<Vec<_>>>().unwrap();
        prop_assert_eq!(shards.concat(), data);
    }
}

#[test]
fn test_blacklist_contains_entry_after_add_and_forgets_it_after_ttl() {
    let blacklist = Blacklist::with_ttl(Duration::from_millis(100));
    let farmer = [7u8; 32];

    blacklist.add(farmer, 0);
    assert!(blacklist.contains(&farmer, 50));
    assert!(!blacklist.contains(&farmer, 200), "entry older than TTL is reaped on read");
}
