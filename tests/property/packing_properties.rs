use cell_packer::invariants::check_invariants;
use cell_packer::metrics::effective_capacity;
use cell_packer::{
    assemble, find_pack, validate, Configuration, MilliampHours, Pack, PackingParams,
    SortedCapacities,
};
use proptest::prelude::*;

fn capacities(max_len: usize) -> impl Strategy<Value = SortedCapacities> {
    prop::collection::vec(2500i64..3600, 1..max_len).prop_map(SortedCapacities::from_unsorted)
}

/// Best sum over every contiguous window of `caps[start..]` within `limit`.
fn brute_force_best(caps: &[MilliampHours], start: usize, limit: MilliampHours) -> MilliampHours {
    let mut best = 0;
    for i in start..caps.len() {
        for j in i..caps.len() {
            if caps[i] - caps[j] <= limit {
                best = best.max(caps[i..=j].iter().sum());
            }
        }
    }
    best
}

proptest! {
    #[test]
    fn finder_never_exceeds_differential(
        caps in capacities(40),
        limit in 0i64..300,
        target in prop::option::of(2500i64..40_000),
    ) {
        let window = find_pack(&caps, 0, caps.len(), limit, target);
        if !window.is_empty() {
            prop_assert!(window.start < window.end);
            prop_assert!(caps[window.start] - caps[window.end - 1] <= limit);
            prop_assert_eq!(window.capacity, caps[window.start..window.end].iter().sum::<i64>());
        }
    }

    #[test]
    fn finder_respects_target(
        caps in capacities(40),
        limit in 0i64..300,
        target in 2500i64..40_000,
    ) {
        let window = find_pack(&caps, 0, caps.len(), limit, Some(target));
        prop_assert!(window.capacity <= target);
    }

    #[test]
    fn unbounded_finder_is_optimal(
        caps in capacities(30),
        limit in 0i64..300,
        offset in 0usize..30,
    ) {
        let start = offset.min(caps.len());
        let window = find_pack(&caps, start, caps.len(), limit, None);
        prop_assert_eq!(window.capacity, brute_force_best(&caps, start, limit));
        if !window.is_empty() {
            prop_assert!(window.start >= start);
        }
    }

    #[test]
    fn effective_capacity_is_len_times_min(cells in prop::collection::vec(1i64..5000, 1..20)) {
        let min = *cells.iter().min().unwrap();
        prop_assert_eq!(effective_capacity(&cells), Some(cells.len() as i64 * min));
        let pack = Pack::from_cells(cells.clone()).unwrap();
        prop_assert_eq!(pack.effective_capacity(), cells.len() as i64 * min);
    }

    #[test]
    fn too_few_packs_never_validate(
        packs in prop::collection::vec(prop::collection::vec(3000i64..3010, 1..4), 0..5),
        extra in 1usize..4,
    ) {
        let config: Configuration = packs.into_iter().filter_map(Pack::from_cells).collect();
        let series_count = config.len() + extra;
        prop_assert!(!validate(&config, i64::MAX, i64::MAX, series_count));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_assemblies_hold_invariants(
        caps in capacities(24),
        series_count in 1usize..5,
        cell_limit in 0i64..150,
        pack_limit in 0i64..3000,
    ) {
        let params = PackingParams::new(series_count, cell_limit, pack_limit).with_max_retries(300);
        if let Ok(assembly) = assemble(&caps, &params) {
            prop_assert_eq!(check_invariants(&assembly), Ok(()));
        }
    }

    #[test]
    fn assembly_is_deterministic(
        caps in capacities(24),
        series_count in 1usize..4,
        cell_limit in 0i64..150,
    ) {
        let params = PackingParams::new(series_count, cell_limit, 1000).with_max_retries(300);
        prop_assert_eq!(assemble(&caps, &params), assemble(&caps, &params));
    }
}
