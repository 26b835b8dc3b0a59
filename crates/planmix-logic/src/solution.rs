//! Solution records handed to callers.
//!
//! These are read-only snapshots: enough to reconstruct every cell's owner,
//! type and geometry without touching the solver.

use crate::grid::{Cell, Grid, CIRCULATION, FREE};
use crate::shape::ShapeDescriptors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Boundary side of an apartment, in grid orientation (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Scan order used when ranking sides.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Unit step leaving a cell through this side.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
        }
    }

    pub fn from_offset(offset: (i32, i32)) -> Option<Side> {
        Side::ALL.into_iter().find(|s| s.offset() == offset)
    }
}

/// One placed apartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedApartment {
    /// 1-based id, in placement order.
    pub id: u32,
    pub kind: String,
    pub size: f64,
    /// Coarse cells in flood-fill order.
    pub cells: Vec<Cell>,
    pub facade_count: usize,
    /// Internal edges of the recorded geometry (fine cells when present).
    pub compactness: f64,
    pub descriptors: ShapeDescriptors,
    pub uses_half_cell: bool,
    /// Side the half-cell pair attaches to.
    pub half_side: Option<Side>,
    /// Fine sub-cells, present when the fine grid was used.
    pub fine_cells: Option<Vec<Cell>>,
}

impl PlacedApartment {
    /// The cells the recorded metrics were computed on.
    pub fn geometry(&self) -> &[Cell] {
        self.fine_cells.as_deref().unwrap_or(&self.cells)
    }
}

/// Aggregate figures of a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Lower is better: `-avg_compactness + shape_variance * weight`.
    pub score: f64,
    pub avg_compactness: f64,
    pub shape_variance: f64,
    pub cell_width_m: f64,
    pub cell_height_m: f64,
    pub n_cells_x: usize,
    pub n_cells_y: usize,
    pub use_fine_grid: bool,
}

/// A complete layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub grid: Grid,
    pub fine_grid: Option<Grid>,
    pub apartments: BTreeMap<u32, PlacedApartment>,
    pub circulation_cells: Vec<Cell>,
    pub metadata: SolutionMetadata,
}

impl Solution {
    pub fn score(&self) -> f64 {
        self.metadata.score
    }

    pub fn shape_variance(&self) -> f64 {
        self.metadata.shape_variance
    }

    /// Apartment owning coarse cell `(x, y)`.
    pub fn owner_of(&self, x: i32, y: i32) -> Option<&PlacedApartment> {
        let label = self.grid.get(x, y)?;
        if label > 0 {
            self.apartments.get(&(label as u32))
        } else {
            None
        }
    }

    /// The grid duplicate detection runs on: fine when present.
    pub fn signature_grid(&self) -> &Grid {
        self.fine_grid.as_ref().unwrap_or(&self.grid)
    }

    /// Type-coded copy of the signature grid.
    ///
    /// Apartment cells become the 1-based rank of their type among the
    /// sorted distinct types of this solution; free and circulation cells
    /// keep their labels, as does any id with no apartment record.
    pub fn canonical_signature(&self) -> Vec<i32> {
        let mut kinds: Vec<&str> = self.apartments.values().map(|a| a.kind.as_str()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        let code_of = |id: i32| -> i32 {
            self.apartments
                .get(&(id as u32))
                .and_then(|a| kinds.binary_search(&a.kind.as_str()).ok())
                .map_or(id, |rank| rank as i32 + 1)
        };
        let grid = self.signature_grid();
        let mut sig = Vec::with_capacity(grid.labels().len() + 2);
        sig.push(grid.width() as i32);
        sig.push(grid.height() as i32);
        sig.extend(grid.labels().iter().map(|&l| match l {
            FREE | CIRCULATION => l,
            id if id > 0 => code_of(id),
            other => other,
        }));
        sig
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;
        writeln!(
            f,
            "   avg compactness: {:.2} | shape variance: {:.4} | score: {:.3}",
            m.avg_compactness, m.shape_variance, m.score
        )?;
        writeln!(
            f,
            "   grid: {} × {} cells ({}m × {}m)",
            m.n_cells_x, m.n_cells_y, m.cell_width_m, m.cell_height_m
        )?;
        for apt in self.apartments.values() {
            let cells = match &apt.fine_cells {
                Some(fine) => format!("{} sub-cells", fine.len()),
                None => format!("{} cells", apt.cells.len()),
            };
            writeln!(
                f,
                "   - apt {} ({}): size {}, {} facade, {}, compact {:.1}",
                apt.id, apt.kind, apt.size, apt.facade_count, cells, apt.compactness
            )?;
        }
        for row in self.grid.rows() {
            write!(f, "     ")?;
            for &label in row {
                match label {
                    CIRCULATION => write!(f, "## ")?,
                    FREE => write!(f, "   ")?,
                    id => write!(f, "{:2} ", id)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
