//! Per-candidate acceptance rules.
//!
//! A candidate region is accepted only if it touches circulation, has
//! enough facade cells for its type, and stays within the enfilade limit.

use crate::apartment::default_facade_requirement;
use crate::config::PlanConfig;
use crate::grid::{Cell, Grid, NEIGHBORS_4};
use crate::site::Site;
use std::collections::{HashMap, HashSet};

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoCirculationContact,
    TooFewFacadeCells { found: usize, required: usize },
    TooManyEnfiladeCells { found: usize, limit: usize },
}

/// Cells with exactly two in-region neighbors that sit on a straight line.
pub fn count_enfilade_cells(cells: &[Cell]) -> usize {
    let set: HashSet<Cell> = cells.iter().copied().collect();
    cells
        .iter()
        .filter(|&&(x, y)| {
            let neighbors: Vec<Cell> = NEIGHBORS_4
                .iter()
                .map(|(dx, dy)| (x + dx, y + dy))
                .filter(|n| set.contains(n))
                .collect();
            match neighbors.as_slice() {
                [(x1, y1), (x2, y2)] => x1 == x2 || y1 == y2,
                _ => false,
            }
        })
        .count()
}

/// Acceptance rules resolved for one search.
#[derive(Debug, Clone)]
pub struct ConstraintChecker {
    facade_requirements: HashMap<String, usize>,
    max_enfilade: Option<usize>,
    require_circulation: bool,
}

impl ConstraintChecker {
    /// Resolve facade thresholds for every type in the config.
    ///
    /// With a non-empty override map, types absent from it need no facade;
    /// otherwise (no map, or an empty one) each type gets the room-count default.
    pub fn from_config(config: &PlanConfig, site: &Site) -> Self {
        let mut facade_requirements = HashMap::new();
        for spec in &config.apartments {
            let required = match &config.min_facade_cells {
                Some(overrides) if !overrides.is_empty() => {
                    overrides.get(&spec.kind).copied().unwrap_or(0)
                }
                _ => default_facade_requirement(&spec.kind),
            };
            facade_requirements.insert(spec.kind.clone(), required);
        }
        Self {
            facade_requirements,
            max_enfilade: config.max_enfilade_cells,
            require_circulation: site.has_circulation(),
        }
    }

    pub fn facade_requirement(&self, kind: &str) -> usize {
        self.facade_requirements.get(kind).copied().unwrap_or(0)
    }

    pub fn max_enfilade(&self) -> Option<usize> {
        self.max_enfilade
    }

    /// Check a region, reporting the first failed rule.
    pub fn check(&self, site: &Site, _grid: &Grid, cells: &[Cell], kind: &str) -> Result<(), Rejection> {
        // Connectivity is guaranteed by the flood-fill that produced `cells`.
        if self.require_circulation && !site.touches_circulation(cells) {
            return Err(Rejection::NoCirculationContact);
        }

        let found = site.facade_count(cells);
        let required = self.facade_requirement(kind);
        if found < required {
            return Err(Rejection::TooFewFacadeCells { found, required });
        }

        if let Some(limit) = self.max_enfilade {
            let found = count_enfilade_cells(cells);
            if found > limit {
                return Err(Rejection::TooManyEnfiladeCells { found, limit });
            }
        }

        Ok(())
    }

    pub fn accepts(&self, site: &Site, grid: &Grid, cells: &[Cell], kind: &str) -> bool {
        self.check(site, grid, cells, kind).is_ok()
    }
}
