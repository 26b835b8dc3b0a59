//! Backtracking placement search.
//!
//! Apartments are placed largest first. At each depth the solver enumerates
//! candidate regions, orders them by compactness, keeps those resembling the
//! shapes already placed, and recurses on every candidate that passes the
//! constraint checker. Each branch works on its own copy of the grid and of
//! the placed map, so nothing needs undoing on backtrack.

use crate::apartment::ApartmentSpec;
use crate::config::{validate_config, ConfigError, PlanConfig};
use crate::constraints::{ConstraintChecker, Rejection};
use crate::grid::{Cell, Grid};
use crate::half_cell::select_half_side;
use crate::ranking::{rank_solutions, RecordOutcome, SolutionRecorder};
use crate::region::find_regions;
use crate::shape::{compactness, shape_descriptors, ShapeDescriptors};
use crate::similarity::filter_similar;
use crate::site::Site;
use crate::solution::{PlacedApartment, Solution};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// Counters collected over one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Search states entered, leaves included.
    pub nodes: u64,
    /// Candidate regions returned by the region finder.
    pub regions_enumerated: u64,
    pub constraint_rejections: u64,
    /// Candidates with no exposed side for their half-cell.
    pub half_side_rejections: u64,
    /// Branches abandoned because no candidate resembled the placed shapes.
    pub similarity_prunes: u64,
    /// Complete placements dropped for lack of a half-cell pair.
    pub half_cell_failures: u64,
    pub duplicates: u64,
    /// Unique solutions recorded before ranking.
    pub raw_solutions: u64,
    pub cap_reached: bool,
    pub node_limit_reached: bool,
}

impl SearchStats {
    pub fn stopped_early(&self) -> bool {
        self.cap_reached || self.node_limit_reached
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} regions, {} rejected, {} half-side rejected, {} similarity prunes, \
             {} half-cell failures, {} duplicates, {} raw solutions",
            self.nodes,
            self.regions_enumerated,
            self.constraint_rejections,
            self.half_side_rejections,
            self.similarity_prunes,
            self.half_cell_failures,
            self.duplicates,
            self.raw_solutions
        )?;
        if self.cap_reached {
            write!(f, " (cap reached)")?;
        }
        if self.node_limit_reached {
            write!(f, " (node limit reached)")?;
        }
        Ok(())
    }
}

/// Ranked solutions plus the counters of the search that produced them.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub solutions: Vec<Solution>,
    pub stats: SearchStats,
}

/// A validated search, ready to run.
#[derive(Debug, Clone)]
pub struct PlanSolver {
    config: PlanConfig,
    site: Site,
    checker: ConstraintChecker,
    order: Vec<ApartmentSpec>,
}

impl PlanSolver {
    /// Validate `config` and fix the placement order.
    pub fn new(config: PlanConfig) -> Result<Self, ConfigError> {
        if let Some(err) = validate_config(&config).into_iter().next() {
            return Err(err);
        }

        let site = Site::from_config(&config);
        let checker = ConstraintChecker::from_config(&config, &site);

        // Stable: equal sizes keep their input order.
        let mut order = config.apartments.clone();
        order.sort_by(|a, b| b.size.total_cmp(&a.size));

        log::info!(
            "plan solver: {}×{} grid, {} circulation cells, {} fine circulation cells, {} apartments",
            site.width,
            site.height,
            site.circulation.len(),
            site.fine_circulation.len(),
            order.len()
        );
        for spec in &order {
            log::info!(
                "  {} size {} ({} cells{}), min facade {}",
                spec.kind,
                spec.size,
                spec.whole_cells(),
                if spec.has_half_cell() { " + half" } else { "" },
                checker.facade_requirement(&spec.kind)
            );
        }

        Ok(Self {
            config,
            site,
            checker,
            order,
        })
    }

    /// Apartments in the order they are placed; ids follow this order.
    pub fn placement_order(&self) -> &[ApartmentSpec] {
        &self.order
    }

    /// Run the full search and rank the result.
    pub fn solve(&self) -> SolveOutcome {
        let mut search = Search {
            solver: self,
            recorder: SolutionRecorder::new(),
            stats: SearchStats::default(),
        };
        search.place(&self.site.initial_grid(), 0, &BTreeMap::new());

        let Search {
            recorder,
            mut stats,
            ..
        } = search;
        stats.raw_solutions = recorder.len() as u64;
        let solutions = rank_solutions(
            recorder.into_solutions(),
            self.config.max_solutions,
            self.config.variance_filter_multiplier,
        );

        log::info!("search done: {}", stats);
        log::info!("returning {} solutions", solutions.len());
        SolveOutcome { solutions, stats }
    }
}

/// Mutable state of one running search.
struct Search<'a> {
    solver: &'a PlanSolver,
    recorder: SolutionRecorder,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    /// Check the global cap and node limit, flagging whichever stopped us.
    fn should_stop(&mut self) -> bool {
        if self.recorder.len() >= self.solver.config.solution_cap() {
            if !self.stats.cap_reached {
                log::warn!(
                    "solution cap of {} reached; stopping search",
                    self.solver.config.solution_cap()
                );
            }
            self.stats.cap_reached = true;
            return true;
        }
        if let Some(limit) = self.solver.config.node_limit {
            if self.stats.nodes >= limit {
                if !self.stats.node_limit_reached {
                    log::warn!("node limit of {} reached; stopping search", limit);
                }
                self.stats.node_limit_reached = true;
                return true;
            }
        }
        false
    }

    fn place(&mut self, grid: &Grid, index: usize, placed: &BTreeMap<u32, PlacedApartment>) {
        if self.should_stop() {
            return;
        }
        self.stats.nodes += 1;

        let solver = self.solver;
        if index == solver.order.len() {
            self.finalize(grid, placed);
            return;
        }

        let spec = &solver.order[index];
        let id = index as u32 + 1;

        let mut regions = find_regions(&solver.site, grid, spec.whole_cells());
        self.stats.regions_enumerated += regions.len() as u64;
        regions.sort_by_key(|cells| Reverse(compactness(cells)));

        if !placed.is_empty() {
            let shapes: Vec<ShapeDescriptors> = placed.values().map(|a| a.descriptors).collect();
            regions = filter_similar(regions, &shapes, solver.config.shape_variance_weight);
            if regions.is_empty() {
                log::debug!("apt {} ({}): no similar region at depth {}", id, spec.kind, index);
                self.stats.similarity_prunes += 1;
                return;
            }
        }
        regions.truncate(solver.config.tries_for(spec));

        for cells in regions {
            if self.should_stop() {
                return;
            }
            let Some(apartment) = self.try_candidate(grid, spec, id, cells) else {
                continue;
            };

            let mut next_grid = grid.clone();
            next_grid.stamp(&apartment.cells, id as i32);
            let mut next_placed = placed.clone();
            next_placed.insert(id, apartment);
            self.place(&next_grid, index + 1, &next_placed);
        }
    }

    /// Check a candidate and build its placed record if it is acceptable.
    fn try_candidate(
        &mut self,
        grid: &Grid,
        spec: &ApartmentSpec,
        id: u32,
        cells: Vec<Cell>,
    ) -> Option<PlacedApartment> {
        let solver = self.solver;
        if let Err(reason) = solver.checker.check(&solver.site, grid, &cells, &spec.kind) {
            log_rejection(id, &spec.kind, reason);
            self.stats.constraint_rejections += 1;
            return None;
        }

        let half_side = if spec.has_half_cell() {
            let side = select_half_side(&cells);
            if side.is_none() {
                self.stats.half_side_rejections += 1;
                return None;
            }
            side
        } else {
            None
        };

        Some(PlacedApartment {
            id,
            kind: spec.kind.clone(),
            size: spec.size,
            facade_count: solver.site.facade_count(&cells),
            compactness: compactness(&cells) as f64,
            descriptors: shape_descriptors(&cells),
            uses_half_cell: spec.has_half_cell(),
            half_side,
            fine_cells: None,
            cells,
        })
    }

    fn finalize(&mut self, grid: &Grid, placed: &BTreeMap<u32, PlacedApartment>) {
        let solver = self.solver;
        match self
            .recorder
            .record(&solver.config, &solver.site, grid, placed)
        {
            RecordOutcome::Recorded => {}
            RecordOutcome::Duplicate => self.stats.duplicates += 1,
            RecordOutcome::HalfCellFailed => self.stats.half_cell_failures += 1,
        }
    }
}

fn log_rejection(id: u32, kind: &str, reason: Rejection) {
    match reason {
        Rejection::NoCirculationContact => {
            log::debug!("apt {} ({}): rejected, no circulation contact", id, kind)
        }
        Rejection::TooFewFacadeCells { found, required } => log::debug!(
            "apt {} ({}): rejected, {} facade cells < {}",
            id,
            kind,
            found,
            required
        ),
        Rejection::TooManyEnfiladeCells { found, limit } => log::debug!(
            "apt {} ({}): rejected, {} enfilade cells > {}",
            id,
            kind,
            found,
            limit
        ),
    }
}

/// Validate, search and rank in one call.
pub fn solve(config: PlanConfig) -> Result<SolveOutcome, ConfigError> {
    Ok(PlanSolver::new(config)?.solve())
}
