//! Property tests for diff alignment over generated region sets

use memory_forensics::{
    Config, ForensicsEngine, MockBackend, MockController, Permissions, Snapshot,
};
use proptest::prelude::*;

const PID: u32 = 1;

type RegionSpec = (usize, Vec<u8>, Permissions);

fn perm_from_index(idx: u8) -> Permissions {
    match idx % 3 {
        0 => Permissions::read_only(),
        1 => Permissions::read_write(),
        _ => Permissions::read_execute(),
    }
}

/// Generates disjoint regions by construction: each region starts at least
/// one page past the end of the previous one.
fn arb_region_specs(min: usize) -> impl Strategy<Value = Vec<RegionSpec>> {
    prop::collection::vec((1usize..32, 16usize..256, any::<u8>(), 0u8..3), min..10).prop_map(
        |entries| {
            let mut specs = Vec::with_capacity(entries.len());
            let mut cursor = 0x1000usize;
            for (gap_pages, len, seed, perm_idx) in entries {
                let start = cursor + gap_pages * 0x1000;
                specs.push((start, vec![seed; len], perm_from_index(perm_idx)));
                cursor = start + len;
            }
            specs
        },
    )
}

/// Installs the regions in reverse order so every capture exercises the
/// sorting pass.
fn engine_with(specs: &[RegionSpec]) -> (ForensicsEngine, MockController) {
    let (backend, controller) = MockBackend::new();
    for (start, bytes, perms) in specs.iter().rev() {
        controller.add_region(PID, *start, *perms, bytes.clone());
    }
    let engine = ForensicsEngine::with_backend(Box::new(backend), Config::default()).unwrap();
    (engine, controller)
}

fn capture(engine: &ForensicsEngine) -> Snapshot {
    let handle = engine.attach(PID).unwrap();
    engine.create_snapshot(&handle).unwrap()
}

proptest! {
    #[test]
    fn prop_self_diff_is_identical(specs in arb_region_specs(1)) {
        let (engine, _controller) = engine_with(&specs);
        let snap = capture(&engine);

        let diff = engine.diff_snapshots(&snap, &snap).unwrap();
        prop_assert!(diff.is_identical());
        prop_assert_eq!(diff.modified_region_count(), 0);
        prop_assert_eq!(diff.modified_byte_count(), 0);
    }

    #[test]
    fn prop_counts_are_symmetric(
        old_specs in arb_region_specs(1),
        new_specs in arb_region_specs(1),
    ) {
        let (engine, controller) = engine_with(&old_specs);
        let before = capture(&engine);

        controller.remove_process(PID);
        for (start, bytes, perms) in &new_specs {
            controller.add_region(PID, *start, *perms, bytes.clone());
        }
        let after = capture(&engine);

        let forward = engine.diff_snapshots(&before, &after).unwrap();
        let backward = engine.diff_snapshots(&after, &before).unwrap();
        prop_assert_eq!(
            forward.modified_region_count(),
            backward.modified_region_count()
        );
        prop_assert_eq!(
            forward.modified_byte_count(),
            backward.modified_byte_count()
        );
    }

    #[test]
    fn prop_snapshot_regions_sorted_non_overlapping(specs in arb_region_specs(1)) {
        let (engine, _controller) = engine_with(&specs);
        let snap = capture(&engine);

        prop_assert_eq!(snap.region_count(), specs.len());
        for pair in snap.regions().windows(2) {
            prop_assert!(pair[0].region.end <= pair[1].region.start);
        }
    }

    #[test]
    fn prop_patching_one_more_region_increases_count(specs in arb_region_specs(2)) {
        let (engine, controller) = engine_with(&specs);
        let handle = engine.attach(PID).unwrap();
        let base = engine.create_snapshot(&handle).unwrap();

        let (first_start, first_bytes, _) = &specs[0];
        controller.patch(PID, *first_start, &[!first_bytes[0]]);
        let one_patched = engine.create_snapshot(&handle).unwrap();

        let (last_start, last_bytes, _) = specs.last().unwrap();
        controller.patch(PID, *last_start, &[!last_bytes[0]]);
        let two_patched = engine.create_snapshot(&handle).unwrap();

        let first = engine.diff_snapshots(&base, &one_patched).unwrap();
        let second = engine.diff_snapshots(&base, &two_patched).unwrap();
        prop_assert_eq!(first.modified_region_count(), 1);
        prop_assert_eq!(second.modified_region_count(), 2);
        prop_assert!(second.modified_byte_count() > first.modified_byte_count());
    }

    #[test]
    fn prop_capture_is_deterministic(specs in arb_region_specs(1)) {
        let (engine, _controller) = engine_with(&specs);
        let first = capture(&engine);
        let second = capture(&engine);
        prop_assert_eq!(first.regions(), second.regions());
    }
}
