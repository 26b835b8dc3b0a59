//! PlanMix Headless Placement Harness
//!
//! Runs the placement engine against a sample building, a set of canned
//! scenarios and a seeded randomized sweep, auditing every returned layout.
//! Runs entirely in-process; no rendering, no files written.
//!
//! Usage:
//!   cargo run -p planmix-simtest
//!   cargo run -p planmix-simtest -- --verbose
//!   cargo run -p planmix-simtest -- --json path/to/building.json
//!   cargo run -p planmix-simtest -- --seed=7

use planmix_logic::apartment::ApartmentSpec;
use planmix_logic::config::{validate_config, PlanConfig};
use planmix_logic::solution::Solution;
use planmix_logic::solver::{PlanSolver, SolveOutcome};
use planmix_logic::validation::{check_unique_signatures, errors_only, validate_solution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::filter::LevelFilter;

// ── Sample building (same JSON the integration tests use) ───────────────
const SAMPLE_BUILDING_JSON: &str = include_str!("../../../data/sample_building.json");

const DEFAULT_SEED: u64 = 0x5EED;
const SWEEP_LAYOUTS: usize = 24;

// ── Logging ─────────────────────────────────────────────────────────────

/// Debug shows pruning, dedup and half-cell events; warnings cover early stops.
fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Route the engine's `log` records to stderr through the `log` bridge.
fn init_logging(verbose: bool) {
    if let Err(e) = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level(verbose))
        .try_init()
    {
        eprintln!("logging unavailable: {}", e);
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    json: bool,
    seed: u64,
    config_paths: Vec<String>,
}

fn parse_args() -> Options {
    let mut opts = Options {
        verbose: false,
        json: false,
        seed: DEFAULT_SEED,
        config_paths: Vec::new(),
    };
    for arg in std::env::args().skip(1) {
        if arg == "--verbose" {
            opts.verbose = true;
        } else if arg == "--json" {
            opts.json = true;
        } else if let Some(seed) = arg.strip_prefix("--seed=") {
            match seed.parse() {
                Ok(s) => opts.seed = s,
                Err(e) => {
                    eprintln!("invalid seed {:?}: {}", seed, e);
                    std::process::exit(2);
                }
            }
        } else {
            opts.config_paths.push(arg);
        }
    }
    opts
}

fn main() {
    let opts = parse_args();
    init_logging(opts.verbose);
    println!("=== PlanMix Placement Harness ===\n");

    let mut results = Vec::new();

    // 1. Sample building
    results.extend(validate_sample_building(&opts));

    // 2. Canned scenarios
    results.extend(validate_scenarios(opts.verbose));

    // 3. Seeded randomized sweep
    results.extend(validate_random_sweep(opts.seed, opts.verbose));

    // 4. User-supplied layouts
    for path in &opts.config_paths {
        results.extend(validate_config_file(path, &opts));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared checks ───────────────────────────────────────────────────────

/// Validate, solve and audit one configuration.
fn run_and_audit(label: &str, config: PlanConfig) -> (Vec<TestResult>, Option<SolveOutcome>) {
    let mut results = Vec::new();

    let config_errors = validate_config(&config);
    results.push(TestResult {
        name: format!("{}_config_valid", label),
        passed: config_errors.is_empty(),
        detail: if config_errors.is_empty() {
            format!(
                "{}×{} grid, {} apartments",
                config.n_cells_x,
                config.n_cells_y,
                config.apartments.len()
            )
        } else {
            config_errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });
    let solver = match PlanSolver::new(config.clone()) {
        Ok(s) => s,
        Err(_) => return (results, None),
    };

    let outcome = solver.solve();
    results.extend(audit_solutions(label, &config, &outcome.solutions));
    (results, Some(outcome))
}

fn audit_solutions(label: &str, config: &PlanConfig, solutions: &[Solution]) -> Vec<TestResult> {
    let mut results = Vec::new();

    let mut bad = Vec::new();
    for (i, s) in solutions.iter().enumerate() {
        let errors = validate_solution(s, config);
        for e in errors_only(&errors) {
            bad.push(format!("#{} [{}] {}", i + 1, e.category, e.message));
        }
    }
    results.push(TestResult {
        name: format!("{}_solutions_valid", label),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            format!("{} solutions pass structural checks", solutions.len())
        } else {
            format!("{} problems: {}", bad.len(), bad.join(" | "))
        },
    });

    let dups = check_unique_signatures(solutions);
    results.push(TestResult {
        name: format!("{}_unique_signatures", label),
        passed: dups.is_empty(),
        detail: format!("{} duplicate signatures", dups.len()),
    });

    let sorted = solutions.windows(2).all(|w| w[0].score() <= w[1].score());
    results.push(TestResult {
        name: format!("{}_sorted_by_score", label),
        passed: sorted,
        detail: match (solutions.first(), solutions.last()) {
            (Some(a), Some(b)) => format!("scores {:.3} … {:.3}", a.score(), b.score()),
            _ => "no solutions".into(),
        },
    });

    let within_budget = solutions.len() <= config.max_solutions;
    results.push(TestResult {
        name: format!("{}_within_budget", label),
        passed: within_budget,
        detail: format!("{} of at most {}", solutions.len(), config.max_solutions),
    });

    results
}

fn print_solutions(solutions: &[Solution], json: bool) {
    if json {
        match serde_json::to_string_pretty(solutions) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to serialize solutions: {}", e),
        }
        return;
    }
    for (i, s) in solutions.iter().enumerate() {
        println!("  Solution #{}", i + 1);
        print!("{}", s);
    }
}

// ── 1. Sample Building ──────────────────────────────────────────────────

fn validate_sample_building(opts: &Options) -> Vec<TestResult> {
    println!("--- Sample Building ---");
    let mut results = Vec::new();

    let config: PlanConfig = match serde_json::from_str(SAMPLE_BUILDING_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "sample_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let (audit, outcome) = run_and_audit("sample", config);
    results.extend(audit);

    if let Some(outcome) = outcome {
        println!("  search: {}", outcome.stats);
        results.push(TestResult {
            name: "sample_has_solutions".into(),
            passed: !outcome.solutions.is_empty(),
            detail: format!("{} solutions", outcome.solutions.len()),
        });
        if opts.verbose || opts.json {
            print_solutions(&outcome.solutions, opts.json);
        }
    }

    results
}

// ── 2. Scenarios ────────────────────────────────────────────────────────

fn scenario(
    w: usize,
    h: usize,
    circulation: Vec<(i32, i32)>,
    apartments: Vec<ApartmentSpec>,
) -> PlanConfig {
    PlanConfig {
        n_cells_x: w,
        n_cells_y: h,
        circulation,
        apartments,
        ..PlanConfig::default()
    }
}

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    // A: lone apartment, no circulation.
    let mut a = scenario(5, 3, vec![], vec![ApartmentSpec::new("T1", 3.0)]);
    a.max_solutions = 1;
    let (audit, outcome) = run_and_audit("scenario_a", a);
    results.extend(audit);
    let count = outcome.map_or(0, |o| o.solutions.len());
    results.push(TestResult {
        name: "scenario_a_single_solution".into(),
        passed: count == 1,
        detail: format!("{} solutions", count),
    });

    // B: corridors cut every free component below the required size.
    let b = scenario(
        5,
        3,
        vec![(1, 0), (1, 1), (1, 2), (3, 0), (3, 1), (3, 2)],
        vec![ApartmentSpec::new("T1", 4.0)],
    );
    let (audit, outcome) = run_and_audit("scenario_b", b);
    results.extend(audit);
    let count = outcome.map_or(usize::MAX, |o| o.solutions.len());
    results.push(TestResult {
        name: "scenario_b_no_solution".into(),
        passed: count == 0,
        detail: format!("{} solutions", count),
    });

    // C: half-cell resolved on the fine grid.
    let c = scenario(4, 4, vec![], vec![ApartmentSpec::new("T1", 3.5)]);
    let (audit, outcome) = run_and_audit("scenario_c", c);
    results.extend(audit);
    let fine_counts: Vec<usize> = outcome
        .iter()
        .flat_map(|o| o.solutions.iter())
        .filter_map(|s| s.apartments.get(&1))
        .filter_map(|a| a.fine_cells.as_ref().map(Vec::len))
        .collect();
    results.push(TestResult {
        name: "scenario_c_fine_cells".into(),
        passed: !fine_counts.is_empty() && fine_counts.iter().all(|&n| n == 14),
        detail: format!("fine cell counts {:?}", fine_counts),
    });

    // D: the only region left for the twin is a strip, unlike the square.
    let mut d = scenario(
        4,
        4,
        vec![(0, 1), (1, 1), (2, 1), (3, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
        vec![ApartmentSpec::new("2p", 4.0), ApartmentSpec::new("2p", 4.0)],
    );
    d.shape_variance_weight = 1000.0;
    let (audit, outcome) = run_and_audit("scenario_d", d);
    results.extend(audit);
    let (count, prunes) = outcome.map_or((usize::MAX, 0), |o| {
        (o.solutions.len(), o.stats.similarity_prunes)
    });
    results.push(TestResult {
        name: "scenario_d_similarity_prunes".into(),
        passed: count == 0 && prunes > 0,
        detail: format!("{} solutions, {} similarity prunes", count, prunes),
    });

    if verbose {
        println!("  {} scenario checks", results.len());
    }
    results
}

// ── 3. Randomized Sweep ─────────────────────────────────────────────────

fn random_config(rng: &mut StdRng) -> PlanConfig {
    let w = rng.gen_range(3..=6);
    let h = rng.gen_range(2..=4);

    let mut circulation = Vec::new();
    let corridor_y = rng.gen_range(0..h) as i32;
    for x in 0..w as i32 {
        if rng.gen_bool(0.6) {
            circulation.push((x, corridor_y));
        }
    }

    let sizes = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
    let kinds = ["1.5p", "2.5p", "3.5p"];
    let n_apartments = rng.gen_range(1..=3);
    let apartments = (0..n_apartments)
        .map(|_| {
            ApartmentSpec::new(
                kinds[rng.gen_range(0..kinds.len())],
                sizes[rng.gen_range(0..sizes.len())],
            )
        })
        .collect();

    PlanConfig {
        n_cells_x: w,
        n_cells_y: h,
        circulation,
        apartments,
        max_solutions: rng.gen_range(1..=5),
        max_enfilade_cells: if rng.gen_bool(0.3) { Some(1) } else { None },
        shape_variance_weight: [10.0, 50.0, 100.0][rng.gen_range(0..3)],
        max_placement_tries: 6,
        use_fine_grid: rng.gen_bool(0.7),
        node_limit: Some(20_000),
        ..PlanConfig::default()
    }
}

fn validate_random_sweep(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Sweep (seed {}) ---", seed);
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut solved = 0;
    let mut total_solutions = 0;
    let mut nondeterministic = Vec::new();
    for i in 0..SWEEP_LAYOUTS {
        let config = random_config(&mut rng);
        let label = format!("sweep_{:02}", i);

        let (audit, outcome) = run_and_audit(&label, config.clone());
        // Only failures are interesting per layout.
        results.extend(audit.into_iter().filter(|r| !r.passed));

        let Some(first) = outcome else { continue };
        if !first.solutions.is_empty() {
            solved += 1;
            total_solutions += first.solutions.len();
        }
        let second = PlanSolver::new(config).map(|s| s.solve());
        if second.map_or(true, |o| o.solutions != first.solutions) {
            nondeterministic.push(label.clone());
        }
        if verbose {
            println!("  {}: {}", label, first.stats);
        }
    }

    results.push(TestResult {
        name: "sweep_deterministic".into(),
        passed: nondeterministic.is_empty(),
        detail: if nondeterministic.is_empty() {
            format!("{} layouts reproduced exactly", SWEEP_LAYOUTS)
        } else {
            format!("differing runs: {}", nondeterministic.join(", "))
        },
    });
    results.push(TestResult {
        name: "sweep_coverage".into(),
        passed: true,
        detail: format!(
            "{}/{} layouts solved, {} solutions audited",
            solved, SWEEP_LAYOUTS, total_solutions
        ),
    });

    results
}

// ── 4. User Layouts ─────────────────────────────────────────────────────

fn validate_config_file(path: &str, opts: &Options) -> Vec<TestResult> {
    println!("--- Layout {} ---", path);
    let label = format!("file:{}", path);

    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            return vec![TestResult {
                name: format!("{}_read", label),
                passed: false,
                detail: e.to_string(),
            }]
        }
    };
    let config: PlanConfig = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            return vec![TestResult {
                name: format!("{}_parse", label),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            }]
        }
    };

    let (results, outcome) = run_and_audit(&label, config);
    if let Some(outcome) = outcome {
        println!("  search: {}", outcome.stats);
        print_solutions(&outcome.solutions, opts.json);
    }
    results
}
