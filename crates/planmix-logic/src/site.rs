//! The fixed building description a search runs against.

use crate::config::PlanConfig;
use crate::grid::{coarse_of, Cell, Grid, CIRCULATION, NEIGHBORS_4};
use std::collections::{BTreeSet, HashSet};

/// Building extents and circulation, immutable for the whole search.
#[derive(Debug, Clone)]
pub struct Site {
    pub width: usize,
    pub height: usize,
    /// Coarse circulation cells.
    pub circulation: BTreeSet<Cell>,
    /// Fine-grid circulation sub-cells.
    pub fine_circulation: BTreeSet<Cell>,
    /// Coarse cells holding fine circulation without being circulation themselves.
    pub partially_blocked: HashSet<Cell>,
}

impl Site {
    pub fn from_config(config: &PlanConfig) -> Self {
        let circulation: BTreeSet<Cell> = config.circulation.iter().copied().collect();
        let fine_circulation: BTreeSet<Cell> = config.fine_circulation.iter().copied().collect();
        let partially_blocked = fine_circulation
            .iter()
            .map(|&f| coarse_of(f))
            .filter(|c| !circulation.contains(c))
            .collect();
        Self {
            width: config.n_cells_x,
            height: config.n_cells_y,
            circulation,
            fine_circulation,
            partially_blocked,
        }
    }

    /// All-free coarse grid with circulation pre-stamped.
    pub fn initial_grid(&self) -> Grid {
        Grid::with_circulation(self.width, self.height, &self.circulation)
    }

    /// Expand a coarse grid to the fine grid and stamp fine circulation.
    pub fn fine_grid(&self, coarse: &Grid) -> Grid {
        let mut fine = coarse.expand_fine();
        for &(fx, fy) in &self.fine_circulation {
            fine.set(fx, fy, CIRCULATION);
        }
        fine
    }

    pub fn has_circulation(&self) -> bool {
        !self.circulation.is_empty() || !self.fine_circulation.is_empty()
    }

    pub fn is_partially_blocked(&self, cell: Cell) -> bool {
        self.partially_blocked.contains(&cell)
    }

    pub fn is_facade(&self, (x, y): Cell) -> bool {
        x == 0 || y == 0 || x as usize == self.width - 1 || y as usize == self.height - 1
    }

    pub fn facade_count(&self, cells: &[Cell]) -> usize {
        cells.iter().filter(|&&c| self.is_facade(c)).count()
    }

    pub fn is_near_circulation(&self, (x, y): Cell) -> bool {
        NEIGHBORS_4
            .iter()
            .any(|(dx, dy)| self.circulation.contains(&(x + dx, y + dy)))
    }

    /// At least one cell is 4-adjacent to coarse circulation.
    pub fn touches_circulation(&self, cells: &[Cell]) -> bool {
        cells.iter().any(|&c| self.is_near_circulation(c))
    }
}
