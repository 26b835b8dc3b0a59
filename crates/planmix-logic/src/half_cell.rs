//! Half-cell resolution on the fine grid.
//!
//! After a full placement, every coarse cell is split into 2×2 sub-cells.
//! Each apartment whose size has a 0.5 remainder then claims two more
//! free, mutually adjacent sub-cells touching its boundary. Apartments are
//! served in id order, so earlier claims are visible to later ones.

use crate::grid::{fine_block, Cell, Grid, FREE, NEIGHBORS_4};
use crate::site::Site;
use crate::solution::{PlacedApartment, Side};
use std::collections::{BTreeMap, HashSet};

/// Side with the most exposed edges (ties resolved in [`Side::ALL`] order).
///
/// `None` when the region has no exposed edge at all, in which case no
/// half-cell can ever attach to it.
pub fn select_half_side(cells: &[Cell]) -> Option<Side> {
    let set: HashSet<Cell> = cells.iter().copied().collect();
    let mut best: Option<(Side, usize)> = None;
    for side in Side::ALL {
        let (dx, dy) = side.offset();
        let exposed = cells
            .iter()
            .filter(|&&(x, y)| !set.contains(&(x + dx, y + dy)))
            .count();
        if exposed > best.map_or(0, |(_, n)| n) {
            best = Some((side, exposed));
        }
    }
    best.map(|(side, _)| side)
}

/// Coarse cells expanded to sub-cells, block by block.
pub fn expand_cells(cells: &[Cell]) -> Vec<Cell> {
    cells.iter().flat_map(|&c| fine_block(c)).collect()
}

/// First free adjacent sub-cell pair on the boundary of `fine_cells`.
///
/// Boundary sub-cells are scanned in order; for each free outside
/// neighbor, vertical partners are tried before horizontal ones.
pub fn find_half_pair(fine: &Grid, fine_cells: &[Cell]) -> Option<([Cell; 2], Side)> {
    let set: HashSet<Cell> = fine_cells.iter().copied().collect();
    for &(fx, fy) in fine_cells {
        for (dx, dy) in NEIGHBORS_4 {
            let first = (fx + dx, fy + dy);
            if set.contains(&first) || fine.get(first.0, first.1) != Some(FREE) {
                continue;
            }
            let partners = [
                (first.0, first.1 + 1),
                (first.0, first.1 - 1),
                (first.0 + 1, first.1),
                (first.0 - 1, first.1),
            ];
            if let Some(&second) = partners.iter().find(|&&(x, y)| fine.is_free(x, y)) {
                let side = Side::from_offset((dx, dy))?;
                return Some(([first, second], side));
            }
        }
    }
    None
}

/// Build the fine grid for a completed placement and attach all half-cells.
///
/// Fills `fine_cells` (and `half_side` for fractional apartments) in place.
/// Returns `None` if any fractional apartment finds no free pair, in which
/// case the placement must be discarded.
pub fn resolve_half_cells(
    site: &Site,
    coarse: &Grid,
    apartments: &mut BTreeMap<u32, PlacedApartment>,
) -> Option<Grid> {
    let mut fine = site.fine_grid(coarse);

    for (&id, apt) in apartments.iter_mut() {
        let mut fine_cells = expand_cells(&apt.cells);
        if apt.uses_half_cell {
            let Some((pair, side)) = find_half_pair(&fine, &fine_cells) else {
                log::debug!("apt {} ({}): no free half-cell pair", id, apt.kind);
                return None;
            };
            fine.stamp(&pair, id as i32);
            fine_cells.extend(pair);
            apt.half_side = Some(side);
        }
        apt.fine_cells = Some(fine_cells);
    }

    Some(fine)
}
