//! Recording, scoring, deduplication and final ranking of solutions.

use crate::config::PlanConfig;
use crate::grid::Grid;
use crate::half_cell::resolve_half_cells;
use crate::shape::{compactness, shape_descriptors, shape_variance};
use crate::site::Site;
use crate::solution::{PlacedApartment, Solution, SolutionMetadata};
use std::collections::{BTreeMap, HashSet};

/// What happened to a completed placement handed to the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Same type-coded layout as an earlier solution.
    Duplicate,
    /// A fractional apartment found no half-cell pair.
    HalfCellFailed,
}

/// Accumulates unique solutions during a search.
#[derive(Debug, Default)]
pub struct SolutionRecorder {
    seen: HashSet<Vec<i32>>,
    solutions: Vec<Solution>,
}

impl SolutionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Finalize a fully placed branch and record it unless it duplicates one already seen.
    pub fn record(
        &mut self,
        config: &PlanConfig,
        site: &Site,
        grid: &Grid,
        placed: &BTreeMap<u32, PlacedApartment>,
    ) -> RecordOutcome {
        let Some(solution) = build_solution(config, site, grid, placed) else {
            return RecordOutcome::HalfCellFailed;
        };
        // The set compares full signatures, so hash collisions cannot merge layouts.
        if !self.seen.insert(solution.canonical_signature()) {
            log::debug!("duplicate layout discarded (score {:.3})", solution.score());
            return RecordOutcome::Duplicate;
        }
        self.solutions.push(solution);
        RecordOutcome::Recorded
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

/// Resolve half-cells (when the fine grid is on) and compute all metrics.
pub fn build_solution(
    config: &PlanConfig,
    site: &Site,
    grid: &Grid,
    placed: &BTreeMap<u32, PlacedApartment>,
) -> Option<Solution> {
    let mut apartments = placed.clone();
    let fine_grid = if config.use_fine_grid {
        Some(resolve_half_cells(site, grid, &mut apartments)?)
    } else {
        None
    };

    let mut descriptors = Vec::with_capacity(apartments.len());
    let mut total_compactness = 0.0;
    for apt in apartments.values_mut() {
        let geometry = apt.geometry();
        let c = compactness(geometry) as f64;
        let d = shape_descriptors(geometry);
        apt.compactness = c;
        apt.descriptors = d;
        total_compactness += c;
        descriptors.push(d);
    }

    let avg_compactness = if apartments.is_empty() {
        0.0
    } else {
        total_compactness / apartments.len() as f64
    };
    let variance = shape_variance(&descriptors);
    let score = -avg_compactness + variance * config.shape_variance_weight;

    Some(Solution {
        grid: grid.clone(),
        fine_grid,
        apartments,
        circulation_cells: site.circulation.iter().copied().collect(),
        metadata: SolutionMetadata {
            score,
            avg_compactness,
            shape_variance: variance,
            cell_width_m: config.cell_width_m,
            cell_height_m: config.cell_height_m,
            n_cells_x: config.n_cells_x,
            n_cells_y: config.n_cells_y,
            use_fine_grid: config.use_fine_grid,
        },
    })
}

/// Fewest solutions the variance post-filter may leave.
pub const MIN_SURVIVORS: usize = 3;

/// Sort by score, drop high-variance outliers when over budget, truncate.
///
/// The variance ceiling is `multiplier` times the mean variance of the best
/// `max(3, n / 5)` solutions. If fewer than three solutions would survive
/// it, the best three are kept instead.
pub fn rank_solutions(
    mut solutions: Vec<Solution>,
    max_solutions: usize,
    multiplier: f64,
) -> Vec<Solution> {
    solutions.sort_by(|a, b| a.score().total_cmp(&b.score()));

    if solutions.len() > max_solutions {
        let n_best = MIN_SURVIVORS.max(solutions.len() / 5).min(solutions.len());
        let avg_best = solutions[..n_best]
            .iter()
            .map(Solution::shape_variance)
            .sum::<f64>()
            / n_best as f64;
        let ceiling = avg_best * multiplier;

        let kept = solutions
            .iter()
            .filter(|s| s.shape_variance() <= ceiling)
            .count();
        if kept >= MIN_SURVIVORS {
            solutions.retain(|s| s.shape_variance() <= ceiling);
        } else {
            log::debug!(
                "variance filter would keep {} of {}; keeping best {}",
                kept,
                solutions.len(),
                MIN_SURVIVORS
            );
            solutions.truncate(MIN_SURVIVORS);
        }
    }

    solutions.truncate(max_solutions);
    solutions
}
