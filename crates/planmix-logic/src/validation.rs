//! Structural validation of finished solutions.
//!
//! Pure functions that take a solution (and the config it came from) and
//! return validation errors. Used by the harness and the integration tests
//! to audit every layout the solver hands out.

use crate::apartment::whole_cells;
use crate::config::PlanConfig;
use crate::constraints::{ConstraintChecker, Rejection};
use crate::grid::{Cell, CIRCULATION, NEIGHBORS_4};
use crate::half_cell::expand_cells;
use crate::site::Site;
use crate::solution::Solution;
use std::collections::{HashMap, HashSet, VecDeque};

/// A solution validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

/// Whether `cells` form a single 4-connected component.
pub fn is_connected(cells: &[Cell]) -> bool {
    let Some(&first) = cells.first() else {
        return true;
    };
    let set: HashSet<Cell> = cells.iter().copied().collect();
    let mut visited = HashSet::from([first]);
    let mut queue = VecDeque::from([first]);
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBORS_4 {
            let next = (x + dx, y + dy);
            if set.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited.len() == set.len()
}

// ── A. Partition ────────────────────────────────────────────────────────

/// Grid labels and apartment cell lists must describe the same partition.
pub fn check_partition(solution: &Solution) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owner: HashMap<Cell, u32> = HashMap::new();

    for (&id, apt) in &solution.apartments {
        if apt.id != id {
            errors.push(error(
                "partition",
                format!("Apartment keyed {} carries id {}", id, apt.id),
            ));
        }
        for &cell in &apt.cells {
            if let Some(prev) = owner.insert(cell, id) {
                errors.push(error(
                    "partition",
                    format!("Cell {:?} claimed by apartments {} and {}", cell, prev, id),
                ));
            }
            if solution.grid.get(cell.0, cell.1) != Some(id as i32) {
                errors.push(error(
                    "partition",
                    format!(
                        "Cell {:?} of apartment {} is labeled {:?} in the grid",
                        cell,
                        id,
                        solution.grid.get(cell.0, cell.1)
                    ),
                ));
            }
        }
    }

    for ((x, y), label) in solution.grid.iter_cells() {
        if label > 0 && !owner.contains_key(&(x, y)) {
            errors.push(error(
                "partition",
                format!("Cell ({}, {}) labeled {} belongs to no apartment list", x, y, label),
            ));
        }
    }

    let listed: HashSet<Cell> = solution.circulation_cells.iter().copied().collect();
    for ((x, y), label) in solution.grid.iter_cells() {
        if (label == CIRCULATION) != listed.contains(&(x, y)) {
            errors.push(error(
                "partition",
                format!("Circulation mismatch at ({}, {})", x, y),
            ));
        }
    }

    errors
}

// ── B. Apartment geometry ───────────────────────────────────────────────

/// Every apartment's coarse cells, and fine cells when present, are 4-connected.
pub fn check_connectivity(solution: &Solution) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for apt in solution.apartments.values() {
        if !is_connected(&apt.cells) {
            errors.push(error(
                "geometry",
                format!("Apartment {} ({}) is not 4-connected", apt.id, apt.kind),
            ));
        }
        if let Some(fine) = &apt.fine_cells {
            if !is_connected(fine) {
                errors.push(error(
                    "geometry",
                    format!(
                        "Apartment {} ({}) fine cells are not 4-connected",
                        apt.id, apt.kind
                    ),
                ));
            }
        }
    }
    errors
}

/// Coarse cell count equals the whole part of the size.
pub fn check_cell_counts(solution: &Solution) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for apt in solution.apartments.values() {
        let expected = whole_cells(apt.size);
        if apt.cells.len() != expected {
            errors.push(error(
                "geometry",
                format!(
                    "Apartment {} ({}) has {} cells, expected {} for size {}",
                    apt.id,
                    apt.kind,
                    apt.cells.len(),
                    expected,
                    apt.size
                ),
            ));
        }
    }
    errors
}

/// Fine cells: full expansion plus, for fractional apartments, one adjacent
/// sub-cell pair touching the apartment.
pub fn check_half_cells(solution: &Solution) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for apt in solution.apartments.values() {
        let Some(fine) = &apt.fine_cells else {
            if solution.fine_grid.is_some() {
                errors.push(error(
                    "half_cell",
                    format!("Apartment {} ({}) has no fine cells", apt.id, apt.kind),
                ));
            }
            continue;
        };

        let expanded: HashSet<Cell> = expand_cells(&apt.cells).into_iter().collect();
        let extra: Vec<Cell> = fine.iter().copied().filter(|c| !expanded.contains(c)).collect();
        let expected_extra = if apt.uses_half_cell { 2 } else { 0 };
        if fine.len() != expanded.len() + expected_extra || extra.len() != expected_extra {
            errors.push(error(
                "half_cell",
                format!(
                    "Apartment {} ({}) has {} fine cells, expected {}",
                    apt.id,
                    apt.kind,
                    fine.len(),
                    expanded.len() + expected_extra
                ),
            ));
            continue;
        }

        if let [a, b] = extra.as_slice() {
            let touching = (a.0 - b.0).abs() + (a.1 - b.1).abs() == 1;
            let attached = extra.iter().any(|&(x, y)| {
                NEIGHBORS_4
                    .iter()
                    .any(|(dx, dy)| expanded.contains(&(x + dx, y + dy)))
            });
            if !touching || !attached {
                errors.push(error(
                    "half_cell",
                    format!(
                        "Apartment {} ({}) half-cell pair {:?} is not a contiguous attached pair",
                        apt.id, apt.kind, extra
                    ),
                ));
            }
            if apt.half_side.is_none() {
                errors.push(error(
                    "half_cell",
                    format!("Apartment {} ({}) has no recorded half side", apt.id, apt.kind),
                ));
            }
        }

        if let Some(grid) = &solution.fine_grid {
            let mislabeled = fine
                .iter()
                .filter(|&&(x, y)| grid.get(x, y) != Some(apt.id as i32))
                .count();
            if mislabeled > 0 {
                errors.push(error(
                    "half_cell",
                    format!(
                        "Apartment {} ({}) has {} fine cells not labeled with its id",
                        apt.id, apt.kind, mislabeled
                    ),
                ));
            }
        }
    }
    errors
}

// ── C. Placement rules ──────────────────────────────────────────────────

/// Re-run the acceptance rules on every placed apartment.
pub fn check_placement_rules(solution: &Solution, config: &PlanConfig) -> Vec<ValidationError> {
    let site = Site::from_config(config);
    let checker = ConstraintChecker::from_config(config, &site);
    let mut errors = Vec::new();
    for apt in solution.apartments.values() {
        let Err(reason) = checker.check(&site, &solution.grid, &apt.cells, &apt.kind) else {
            continue;
        };
        let (category, detail) = match reason {
            Rejection::NoCirculationContact => ("circulation", "no circulation contact".to_string()),
            Rejection::TooFewFacadeCells { found, required } => (
                "facade",
                format!("{} facade cells, {} required", found, required),
            ),
            Rejection::TooManyEnfiladeCells { found, limit } => (
                "enfilade",
                format!("{} enfilade cells, limit {}", found, limit),
            ),
        };
        errors.push(error(
            category,
            format!("Apartment {} ({}): {}", apt.id, apt.kind, detail),
        ));
    }
    errors
}

/// Stored facade counts should match the coarse geometry.
pub fn check_recorded_facade(solution: &Solution, config: &PlanConfig) -> Vec<ValidationError> {
    let site = Site::from_config(config);
    solution
        .apartments
        .values()
        .filter_map(|apt| {
            let actual = site.facade_count(&apt.cells);
            (actual != apt.facade_count).then(|| ValidationError {
                category: "facade",
                severity: Severity::Warning,
                message: format!(
                    "Apartment {} ({}) records {} facade cells, geometry has {}",
                    apt.id, apt.kind, apt.facade_count, actual
                ),
            })
        })
        .collect()
}

// ── D. Cross-solution ───────────────────────────────────────────────────

/// No two solutions may share a type-coded signature.
pub fn check_unique_signatures(solutions: &[Solution]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<Vec<i32>, usize> = HashMap::new();
    for (i, s) in solutions.iter().enumerate() {
        if let Some(first) = seen.insert(s.canonical_signature(), i) {
            errors.push(error(
                "signature",
                format!("Solutions #{} and #{} share a signature", first, i),
            ));
        }
    }
    errors
}

/// Run every per-solution check.
pub fn validate_solution(solution: &Solution, config: &PlanConfig) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_partition(solution));
    all.extend(check_connectivity(solution));
    all.extend(check_cell_counts(solution));
    all.extend(check_half_cells(solution));
    all.extend(check_placement_rules(solution, config));
    all.extend(check_recorded_facade(solution, config));
    all
}

/// Only the `Error`-severity entries.
pub fn errors_only(errors: &[ValidationError]) -> Vec<&ValidationError> {
    errors
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .collect()
}
