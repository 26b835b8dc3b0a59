//! Integration tests for the full placement search.
//!
//! Exercises: PlanConfig → PlanSolver → region search → half-cell
//! resolution → recording → ranking → validation.
//!
//! All tests are pure logic; no rendering, no files written.

use planmix_logic::apartment::ApartmentSpec;
use planmix_logic::config::{ConfigError, PlanConfig};
use planmix_logic::grid::{Cell, CIRCULATION, FREE};
use planmix_logic::similarity::distance_threshold;
use planmix_logic::solution::Solution;
use planmix_logic::solver::{solve, PlanSolver, SolveOutcome};
use planmix_logic::validation::{check_unique_signatures, errors_only, validate_solution};

const SAMPLE_BUILDING_JSON: &str = include_str!("../../../data/sample_building.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn layout(w: usize, h: usize, circulation: Vec<Cell>, apartments: Vec<ApartmentSpec>) -> PlanConfig {
    PlanConfig {
        n_cells_x: w,
        n_cells_y: h,
        circulation,
        apartments,
        ..PlanConfig::default()
    }
}

fn run(config: &PlanConfig) -> SolveOutcome {
    solve(config.clone()).expect("config should be valid")
}

fn assert_all_valid(config: &PlanConfig, solutions: &[Solution]) {
    for (i, s) in solutions.iter().enumerate() {
        let errors = validate_solution(s, config);
        let hard = errors_only(&errors);
        assert!(
            hard.is_empty(),
            "solution #{} failed validation: {:?}",
            i + 1,
            hard.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
    }
    assert!(check_unique_signatures(solutions).is_empty());
}

/// Two 2×2 bays on either side of a corridor column.
fn twin_bays(kind_a: &str, kind_b: &str) -> PlanConfig {
    layout(
        5,
        2,
        vec![(2, 0), (2, 1)],
        vec![ApartmentSpec::new(kind_a, 4.0), ApartmentSpec::new(kind_b, 4.0)],
    )
}

/// A 1×4 strip above a corridor and a 2×2 bay below it.
fn strip_and_bay(apartments: Vec<ApartmentSpec>) -> PlanConfig {
    let mut config = layout(
        4,
        4,
        vec![(0, 1), (1, 1), (2, 1), (3, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
        apartments,
    );
    config.shape_variance_weight = 1000.0;
    config
}

// ── Reference scenarios ────────────────────────────────────────────────

#[test]
fn lone_apartment_without_circulation_yields_one_solution() {
    let mut config = layout(5, 3, vec![], vec![ApartmentSpec::new("T1", 3.0)]);
    config.max_solutions = 1;
    let out = run(&config);
    assert_eq!(out.solutions.len(), 1);
    assert_eq!(out.solutions[0].apartments[&1].cells.len(), 3);
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn lone_apartment_finds_several_distinct_layouts() {
    let config = layout(5, 3, vec![], vec![ApartmentSpec::new("T1", 3.0)]);
    let out = run(&config);
    assert!(out.solutions.len() > 1);
    assert!(out.solutions.len() <= config.max_solutions);
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn corridors_cutting_all_components_give_no_solution() {
    let config = layout(
        5,
        3,
        vec![(1, 0), (1, 1), (1, 2), (3, 0), (3, 1), (3, 2)],
        vec![ApartmentSpec::new("T1", 4.0)],
    );
    let out = run(&config);
    assert!(out.solutions.is_empty());
    assert_eq!(out.stats.regions_enumerated, 0);
    assert!(!out.stats.stopped_early());
}

#[test]
fn half_cell_adds_two_fine_sub_cells() {
    let config = layout(4, 4, vec![], vec![ApartmentSpec::new("T1", 3.5)]);
    let out = run(&config);
    assert!(!out.solutions.is_empty());
    for s in &out.solutions {
        let apt = &s.apartments[&1];
        assert_eq!(apt.cells.len(), 3);
        assert_eq!(apt.fine_cells.as_ref().map(Vec::len), Some(14));
        assert!(apt.half_side.is_some());
        let fine = s.fine_grid.as_ref().expect("fine grid recorded");
        assert_eq!(fine.count(1), 14);
    }
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn coarse_only_mode_skips_fine_grid() {
    let mut config = layout(4, 4, vec![], vec![ApartmentSpec::new("T1", 3.5)]);
    config.use_fine_grid = false;
    let out = run(&config);
    assert!(!out.solutions.is_empty());
    for s in &out.solutions {
        assert!(s.fine_grid.is_none());
        assert!(s.apartments[&1].fine_cells.is_none());
        assert!(!s.metadata.use_fine_grid);
    }
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn dissimilar_twin_prunes_whole_search() {
    let twins = strip_and_bay(vec![
        ApartmentSpec::new("2p", 4.0),
        ApartmentSpec::new("2p", 4.0),
    ]);
    let out = run(&twins);
    assert!(out.solutions.is_empty());
    assert!(out.stats.similarity_prunes > 0);

    // Either region alone is a valid placement.
    let single = strip_and_bay(vec![ApartmentSpec::new("2p", 4.0)]);
    let out = run(&single);
    assert_eq!(out.solutions.len(), 2);
}

#[test]
fn similar_twin_stays_within_tightened_threshold() {
    let mut config = twin_bays("2p", "2p");
    config.shape_variance_weight = 1000.0;
    let out = run(&config);
    assert_eq!(out.solutions.len(), 1);

    let s = &out.solutions[0];
    let first = s.apartments[&1].descriptors;
    let second = s.apartments[&2].descriptors;
    let threshold = distance_threshold(config.shape_variance_weight, 0.0);
    assert!(second.distance(&first.as_array()) <= threshold);
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn half_cell_failure_drops_only_that_branch() {
    // 3×1 strip: the half-cell apartment needs a free neighbor cell, which the
    // first explored placement (side by side from the left) leaves none of.
    let config = layout(
        3,
        1,
        vec![],
        vec![ApartmentSpec::new("a", 1.5), ApartmentSpec::new("b", 1.0)],
    );
    let out = run(&config);
    assert_eq!(out.stats.half_cell_failures, 2);
    assert_eq!(out.stats.raw_solutions, 4);
    assert_eq!(out.solutions.len(), 4);
    for s in &out.solutions {
        let a = &s.apartments[&1];
        let b = &s.apartments[&2];
        let gap = (a.cells[0].0 - b.cells[0].0).abs();
        // Adjacent pairs only survive with a free cell on a's other side.
        assert!(gap == 2 || a.cells[0] == (1, 0));
        assert_eq!(a.fine_cells.as_ref().map(Vec::len), Some(6));
    }
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn fine_circulation_blocks_coarse_cell_and_shows_in_fine_grid() {
    let mut config = layout(4, 2, vec![(0, 0), (0, 1)], vec![ApartmentSpec::new("a", 2.5)]);
    // One sub-cell of coarse (3, 0).
    config.fine_circulation = vec![(6, 0)];
    let out = run(&config);
    assert!(!out.solutions.is_empty());
    for s in &out.solutions {
        assert!(!s.apartments[&1].cells.contains(&(3, 0)));
        assert_eq!(s.grid.get(3, 0), Some(FREE));
        let fine = s.fine_grid.as_ref().expect("fine grid recorded");
        assert_eq!(fine.get(6, 0), Some(CIRCULATION));
        assert_eq!(fine.count(CIRCULATION), 2 * 4 + 1);
        assert_eq!(fine.count(1), 10);
    }
    assert_all_valid(&config, &out.solutions);
}

// ── Deduplication & ranking ────────────────────────────────────────────

#[test]
fn same_type_mirror_layouts_are_merged() {
    let out = run(&twin_bays("2p", "2p"));
    assert_eq!(out.solutions.len(), 1);
    assert_eq!(out.stats.duplicates, 1);
}

#[test]
fn different_types_keep_both_layouts() {
    let out = run(&twin_bays("2p", "3p"));
    assert_eq!(out.solutions.len(), 2);
    assert_eq!(out.stats.duplicates, 0);
}

#[test]
fn solutions_sorted_by_score() {
    let config = layout(
        6,
        3,
        vec![(0, 1), (1, 1), (2, 1), (3, 1), (4, 1), (5, 1)],
        vec![ApartmentSpec::new("2p", 3.0), ApartmentSpec::new("2p", 3.0)],
    );
    let out = run(&config);
    assert!(!out.solutions.is_empty());
    assert!(out
        .solutions
        .windows(2)
        .all(|w| w[0].score() <= w[1].score()));
    assert_all_valid(&config, &out.solutions);
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn repeated_runs_are_identical() {
    let config = layout(
        5,
        4,
        vec![(2, 1), (2, 2)],
        vec![
            ApartmentSpec::new("2.5p", 4.0),
            ApartmentSpec::new("1.5p", 2.5),
            ApartmentSpec::new("1.5p", 2.5),
        ],
    );
    let a = run(&config);
    let b = run(&config);
    assert_eq!(a.solutions, b.solutions);
    assert_eq!(a.stats, b.stats);
}

// ── Configuration ──────────────────────────────────────────────────────

#[test]
fn invalid_configs_rejected_before_search() {
    let mut config = layout(0, 3, vec![], vec![ApartmentSpec::new("T1", 3.0)]);
    assert_eq!(
        PlanSolver::new(config.clone()).unwrap_err(),
        ConfigError::ZeroGridWidth
    );

    config.n_cells_x = 3;
    config.apartments = vec![ApartmentSpec::new("T1", -2.0)];
    assert!(matches!(
        PlanSolver::new(config.clone()),
        Err(ConfigError::NonPositiveSize { .. })
    ));

    config.apartments.clear();
    assert_eq!(
        PlanSolver::new(config).unwrap_err(),
        ConfigError::NoApartments
    );
}

#[test]
fn facade_override_map_enforced() {
    let mut config = layout(
        4,
        3,
        vec![(1, 1), (2, 1)],
        vec![ApartmentSpec::new("3p", 3.0)],
    );
    config.min_facade_cells = Some([("3p".to_string(), 3)].into_iter().collect());
    let out = run(&config);
    assert!(!out.solutions.is_empty());
    for s in &out.solutions {
        assert!(s.apartments[&1].facade_count >= 3);
    }
    assert_all_valid(&config, &out.solutions);
}

#[test]
fn sample_building_parses_and_solves() {
    let mut config: PlanConfig =
        serde_json::from_str(SAMPLE_BUILDING_JSON).expect("sample JSON should parse");
    assert_eq!(config.apartments.len(), 5);
    assert_eq!(config.circulation.len(), 4);

    config.node_limit = Some(5_000);
    let out = run(&config);
    assert!(out.solutions.len() <= config.max_solutions);
    assert_all_valid(&config, &out.solutions);

    for s in &out.solutions {
        let grid = &s.grid;
        assert_eq!(grid.count(CIRCULATION), 4);
        let occupied: usize = s.apartments.values().map(|a| a.cells.len()).sum();
        assert_eq!(occupied + grid.count(CIRCULATION) + grid.count(FREE), 40);
    }
}

#[test]
fn solutions_roundtrip_through_json() {
    let out = run(&twin_bays("2p", "3p"));
    let json = serde_json::to_string(&out.solutions).unwrap();
    let back: Vec<Solution> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, out.solutions);
}
