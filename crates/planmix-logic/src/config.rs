//! Solver configuration and validation.
//!
//! A [`PlanConfig`] carries everything a search needs: building extents,
//! circulation, the apartment mix and the tuning knobs of the similarity
//! heuristic. It is validated once, up front; nothing discovered during
//! the search is ever reported as a configuration error.
//!
//! ```
//! use planmix_logic::apartment::ApartmentSpec;
//! use planmix_logic::config::{validate_config, PlanConfig};
//!
//! let mut config = PlanConfig::default();
//! config.apartments = vec![ApartmentSpec::new("2.5p", 5.0)];
//! assert!(validate_config(&config).is_empty());
//! ```

use crate::apartment::ApartmentSpec;
use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Inputs of a placement search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Physical width of one coarse cell, in meters.
    pub cell_width_m: f64,
    /// Physical height of one coarse cell, in meters.
    pub cell_height_m: f64,
    /// Building extent in coarse cells.
    pub n_cells_x: usize,
    pub n_cells_y: usize,
    /// Coarse circulation cells.
    pub circulation: Vec<Cell>,
    /// Fine-grid circulation sub-cells, independent of `circulation`.
    pub fine_circulation: Vec<Cell>,
    /// Apartments to place; duplicates are distinct instances.
    pub apartments: Vec<ApartmentSpec>,
    /// Number of solutions returned after ranking.
    pub max_solutions: usize,
    /// Per-type facade minimums. When non-empty, types missing from the map need 0.
    pub min_facade_cells: Option<HashMap<String, usize>>,
    /// Maximum enfilade (pass-through) cells per apartment.
    pub max_enfilade_cells: Option<usize>,
    /// Weight of shape variance in the score; also sets similarity strictness.
    pub shape_variance_weight: f64,
    /// Multiplier on the best solutions' mean variance for post-filtering.
    pub variance_filter_multiplier: f64,
    /// Candidate regions tried per apartment per branch.
    pub max_placement_tries: usize,
    /// Resolve half-cells on a 2×2 fine grid.
    pub use_fine_grid: bool,
    /// Stop after this many search nodes.
    pub node_limit: Option<u64>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            cell_width_m: 3.7,
            cell_height_m: 3.7,
            n_cells_x: 8,
            n_cells_y: 5,
            circulation: Vec::new(),
            fine_circulation: Vec::new(),
            apartments: Vec::new(),
            max_solutions: 10,
            min_facade_cells: None,
            max_enfilade_cells: None,
            shape_variance_weight: 100.0,
            variance_filter_multiplier: 1.5,
            max_placement_tries: 30,
            use_fine_grid: true,
            node_limit: None,
        }
    }
}

impl PlanConfig {
    /// Global cap on raw recorded solutions.
    pub fn solution_cap(&self) -> usize {
        self.max_solutions.saturating_mul(200)
    }

    /// Placement tries for one apartment: ×1.5 when it carries a half-cell.
    pub fn tries_for(&self, spec: &ApartmentSpec) -> usize {
        if spec.has_half_cell() {
            (self.max_placement_tries as f64 * 1.5) as usize
        } else {
            self.max_placement_tries
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Cell width or height is zero, negative or not finite.
    InvalidCellDimensions { width: f64, height: f64 },
    /// Grid has no columns.
    ZeroGridWidth,
    /// Grid has no rows.
    ZeroGridHeight,
    /// Nothing to place.
    NoApartments,
    /// Apartment at this index has an empty type name.
    EmptyTypeName(usize),
    /// Apartment size is zero, negative or not finite.
    NonPositiveSize { kind: String, size: f64 },
    /// Apartment has no whole cell to seed its region.
    SizeBelowOneCell { kind: String, size: f64 },
    /// Coarse circulation cell outside the grid.
    CirculationOutOfBounds(Cell),
    /// Fine circulation sub-cell outside the fine grid.
    FineCirculationOutOfBounds(Cell),
    ZeroMaxSolutions,
    ZeroPlacementTries,
    /// Shape weight must be strictly positive (it divides the strictness base).
    NonPositiveShapeWeight(f64),
    NegativeVarianceMultiplier(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCellDimensions { width, height } => {
                write!(f, "cell dimensions must be positive, got {}×{}", width, height)
            }
            ConfigError::ZeroGridWidth => write!(f, "grid width must be at least 1 cell"),
            ConfigError::ZeroGridHeight => write!(f, "grid height must be at least 1 cell"),
            ConfigError::NoApartments => write!(f, "apartment list is empty"),
            ConfigError::EmptyTypeName(i) => write!(f, "apartment #{} has an empty type name", i),
            ConfigError::NonPositiveSize { kind, size } => {
                write!(f, "apartment {} has non-positive size {}", kind, size)
            }
            ConfigError::SizeBelowOneCell { kind, size } => {
                write!(f, "apartment {} of size {} has no whole cell", kind, size)
            }
            ConfigError::CirculationOutOfBounds((x, y)) => {
                write!(f, "circulation cell ({}, {}) is outside the grid", x, y)
            }
            ConfigError::FineCirculationOutOfBounds((x, y)) => {
                write!(f, "fine circulation cell ({}, {}) is outside the fine grid", x, y)
            }
            ConfigError::ZeroMaxSolutions => write!(f, "max_solutions must be at least 1"),
            ConfigError::ZeroPlacementTries => write!(f, "max_placement_tries must be at least 1"),
            ConfigError::NonPositiveShapeWeight(w) => {
                write!(f, "shape_variance_weight must be positive, got {}", w)
            }
            ConfigError::NegativeVarianceMultiplier(m) => {
                write!(f, "variance_filter_multiplier must not be negative, got {}", m)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn in_bounds((x, y): Cell, width: usize, height: usize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &PlanConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let dims_ok = |v: f64| v.is_finite() && v > 0.0;
    if !dims_ok(config.cell_width_m) || !dims_ok(config.cell_height_m) {
        errors.push(ConfigError::InvalidCellDimensions {
            width: config.cell_width_m,
            height: config.cell_height_m,
        });
    }
    if config.n_cells_x == 0 {
        errors.push(ConfigError::ZeroGridWidth);
    }
    if config.n_cells_y == 0 {
        errors.push(ConfigError::ZeroGridHeight);
    }

    if config.apartments.is_empty() {
        errors.push(ConfigError::NoApartments);
    }
    for (i, spec) in config.apartments.iter().enumerate() {
        if spec.kind.trim().is_empty() {
            errors.push(ConfigError::EmptyTypeName(i));
        }
        if !spec.size.is_finite() || spec.size <= 0.0 {
            errors.push(ConfigError::NonPositiveSize {
                kind: spec.kind.clone(),
                size: spec.size,
            });
        } else if spec.whole_cells() == 0 {
            errors.push(ConfigError::SizeBelowOneCell {
                kind: spec.kind.clone(),
                size: spec.size,
            });
        }
    }

    for &cell in &config.circulation {
        if !in_bounds(cell, config.n_cells_x, config.n_cells_y) {
            errors.push(ConfigError::CirculationOutOfBounds(cell));
        }
    }
    for &cell in &config.fine_circulation {
        if !in_bounds(cell, config.n_cells_x * 2, config.n_cells_y * 2) {
            errors.push(ConfigError::FineCirculationOutOfBounds(cell));
        }
    }

    if config.max_solutions == 0 {
        errors.push(ConfigError::ZeroMaxSolutions);
    }
    if config.max_placement_tries == 0 {
        errors.push(ConfigError::ZeroPlacementTries);
    }
    if config.shape_variance_weight.is_nan() || config.shape_variance_weight <= 0.0 {
        errors.push(ConfigError::NonPositiveShapeWeight(
            config.shape_variance_weight,
        ));
    }
    if config.variance_filter_multiplier < 0.0 || config.variance_filter_multiplier.is_nan() {
        errors.push(ConfigError::NegativeVarianceMultiplier(
            config.variance_filter_multiplier,
        ));
    }

    errors
}
