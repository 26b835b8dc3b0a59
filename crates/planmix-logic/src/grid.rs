//! Labeled cell grids.
//!
//! A [`Grid`] is a row-major array of integer labels: [`FREE`] (0),
//! [`CIRCULATION`] (-1), or a positive apartment id. The same type backs
//! both the coarse project grid and the 2×2-subdivided fine grid.

use serde::{Deserialize, Serialize};

/// Label of an unassigned cell.
pub const FREE: i32 = 0;
/// Label of a circulation (corridor / shared access) cell.
pub const CIRCULATION: i32 = -1;

/// Integer cell coordinate `(x, y)`, origin top-left.
pub type Cell = (i32, i32);

/// 4-neighborhood offsets, in the order every scan in this crate uses.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// A 2D array of cell labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    labels: Vec<i32>,
}

impl Grid {
    /// Create an all-free grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            labels: vec![FREE; width * height],
        }
    }

    /// Create a grid with the given cells pre-stamped as circulation.
    /// Out-of-bounds cells are ignored.
    pub fn with_circulation<'a>(
        width: usize,
        height: usize,
        circulation: impl IntoIterator<Item = &'a Cell>,
    ) -> Self {
        let mut grid = Self::new(width, height);
        for &(x, y) in circulation {
            grid.set(x, y, CIRCULATION);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Label at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<i32> {
        if self.contains(x, y) {
            Some(self.labels[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Set the label at `(x, y)`. Returns false (and does nothing) outside the grid.
    pub fn set(&mut self, x: i32, y: i32, label: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.labels[y as usize * self.width + x as usize] = label;
        true
    }

    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(FREE)
    }

    /// Stamp every cell of `cells` with `label`.
    pub fn stamp(&mut self, cells: &[Cell], label: i32) {
        for &(x, y) in cells {
            self.set(x, y, label);
        }
    }

    /// Number of cells carrying `label`.
    pub fn count(&self, label: i32) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Raw row-major labels.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.labels.chunks(self.width.max(1))
    }

    /// Iterate `((x, y), label)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, i32)> + '_ {
        let width = self.width;
        self.labels
            .iter()
            .enumerate()
            .map(move |(i, &l)| (((i % width) as i32, (i / width) as i32), l))
    }

    /// Double-resolution copy: each cell becomes a 2×2 block with the same label.
    pub fn expand_fine(&self) -> Grid {
        let mut fine = Grid::new(self.width * 2, self.height * 2);
        for ((x, y), label) in self.iter_cells() {
            for dy in 0..2 {
                for dx in 0..2 {
                    fine.set(x * 2 + dx, y * 2 + dy, label);
                }
            }
        }
        fine
    }
}

/// The four fine sub-cells of a coarse cell, in `dy`-major order.
pub fn fine_block((x, y): Cell) -> [Cell; 4] {
    [
        (x * 2, y * 2),
        (x * 2 + 1, y * 2),
        (x * 2, y * 2 + 1),
        (x * 2 + 1, y * 2 + 1),
    ]
}

/// Coarse cell containing a fine sub-cell.
pub fn coarse_of((fx, fy): Cell) -> Cell {
    (fx.div_euclid(2), fy.div_euclid(2))
}
