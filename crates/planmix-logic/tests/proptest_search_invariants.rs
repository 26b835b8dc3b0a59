//! Property-based invariant tests for the placement search.
//!
//! For any small layout the solver must return only structurally valid
//! solutions:
//!
//! 1. Every solution passes the structural audit (partition, connectivity,
//!    cell counts, half-cell pairs, placement rules).
//! 2. No two solutions share a type-coded signature.
//! 3. Solutions come back sorted by score and within the requested count.
//! 4. Two runs on the same input agree exactly.

use planmix_logic::apartment::ApartmentSpec;
use planmix_logic::config::PlanConfig;
use planmix_logic::solver::solve;
use planmix_logic::validation::{check_unique_signatures, errors_only, validate_solution};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn apartment_strategy() -> impl Strategy<Value = ApartmentSpec> {
    (
        prop::sample::select(vec!["1.5p", "2.5p", "3.5p"]),
        prop::sample::select(vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5]),
    )
        .prop_map(|(kind, size)| ApartmentSpec::new(kind, size))
}

fn layout_strategy() -> impl Strategy<Value = PlanConfig> {
    (2usize..=5, 2usize..=4)
        .prop_flat_map(|(w, h)| {
            (
                Just(w),
                Just(h),
                prop::collection::vec(any::<bool>(), w * h),
                prop::collection::vec(apartment_strategy(), 1..=3),
                1usize..=4,
                any::<bool>(),
            )
        })
        .prop_map(|(w, h, mask, apartments, max_solutions, use_fine_grid)| {
            // Sparse circulation: roughly one cell in four.
            let circulation = mask
                .chunks(2)
                .enumerate()
                .filter(|(_, pair)| pair.iter().all(|&b| b))
                .map(|(i, _)| {
                    let idx = (i * 2) % (w * h);
                    ((idx % w) as i32, (idx / w) as i32)
                })
                .collect();
            PlanConfig {
                n_cells_x: w,
                n_cells_y: h,
                circulation,
                apartments,
                max_solutions,
                max_placement_tries: 5,
                use_fine_grid,
                node_limit: Some(5_000),
                ..PlanConfig::default()
            }
        })
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Returned solutions are valid, unique, sorted and bounded
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn returned_solutions_are_valid(config in layout_strategy()) {
        let out = solve(config.clone()).expect("generated configs are valid");

        for (i, s) in out.solutions.iter().enumerate() {
            let errors = validate_solution(s, &config);
            let hard = errors_only(&errors);
            prop_assert!(
                hard.is_empty(),
                "solution #{} invalid for {:?}: {:?}",
                i, config, hard.iter().map(|e| &e.message).collect::<Vec<_>>()
            );
        }
        prop_assert!(check_unique_signatures(&out.solutions).is_empty());
        prop_assert!(out.solutions.len() <= config.max_solutions);
        prop_assert!(out.solutions.windows(2).all(|w| w[0].score() <= w[1].score()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn search_is_deterministic(config in layout_strategy()) {
        let a = solve(config.clone()).expect("generated configs are valid");
        let b = solve(config).expect("generated configs are valid");
        prop_assert_eq!(a.solutions, b.solutions);
        prop_assert_eq!(a.stats, b.stats);
    }
}
