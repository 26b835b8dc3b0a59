//! Candidate region enumeration by prioritized flood-fill.
//!
//! Every free, non-partially-blocked cell is a potential seed. Seeds next
//! to circulation come first, then seeds on the facade, then the rest, each
//! group in row-major order. From each seed a breadth-first fill collects
//! cells until it holds exactly `n`; seeds that run out of reachable free
//! cells first yield nothing. Identical cell sets reached from different
//! seeds are reported once, at their first discovery.

use crate::grid::{Cell, Grid, NEIGHBORS_4};
use crate::site::Site;
use std::collections::{HashSet, VecDeque};

/// Seed cells in priority order.
pub fn candidate_starts(site: &Site, grid: &Grid) -> Vec<Cell> {
    let mut starts: Vec<(Cell, bool, bool)> = Vec::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if !grid.is_free(x, y) || site.is_partially_blocked((x, y)) {
                continue;
            }
            starts.push(((x, y), site.is_near_circulation((x, y)), site.is_facade((x, y))));
        }
    }
    // Stable: row-major order survives within each priority group.
    starts.sort_by_key(|&(_, near, facade)| (!near, !facade));
    starts.into_iter().map(|(c, _, _)| c).collect()
}

/// Breadth-first fill from `start` over free cells, stopping at `target` cells.
///
/// Returns the cells in visit order, or `None` if fewer than `target` are reachable.
pub fn flood_fill(site: &Site, grid: &Grid, start: Cell, target: usize) -> Option<Vec<Cell>> {
    if target == 0 {
        return None;
    }
    let mut visited: HashSet<Cell> = HashSet::new();
    let mut cells = Vec::with_capacity(target);
    let mut queue = VecDeque::from([start]);

    while let Some((x, y)) = queue.pop_front() {
        if cells.len() >= target {
            break;
        }
        if visited.contains(&(x, y)) {
            continue;
        }
        if !grid.is_free(x, y) || site.is_partially_blocked((x, y)) {
            continue;
        }
        visited.insert((x, y));
        cells.push((x, y));

        for (dx, dy) in NEIGHBORS_4 {
            let next = (x + dx, y + dy);
            if !visited.contains(&next) {
                queue.push_back(next);
            }
        }
    }

    (cells.len() == target).then_some(cells)
}

/// All distinct connected regions of exactly `target` cells, in discovery order.
pub fn find_regions(site: &Site, grid: &Grid, target: usize) -> Vec<Vec<Cell>> {
    let mut regions = Vec::new();
    let mut seen: HashSet<Vec<Cell>> = HashSet::new();
    for start in candidate_starts(site, grid) {
        if let Some(region) = flood_fill(site, grid, start, target) {
            let mut key = region.clone();
            key.sort_unstable();
            if seen.insert(key) {
                regions.push(region);
            }
        }
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;

    fn site(w: usize, h: usize, circulation: Vec<Cell>, fine: Vec<Cell>) -> Site {
        Site::from_config(&PlanConfig {
            n_cells_x: w,
            n_cells_y: h,
            circulation,
            fine_circulation: fine,
            ..PlanConfig::default()
        })
    }

    fn is_connected(cells: &[Cell]) -> bool {
        let set: HashSet<Cell> = cells.iter().copied().collect();
        let mut seen = HashSet::from([cells[0]]);
        let mut stack = vec![cells[0]];
        while let Some((x, y)) = stack.pop() {
            for (dx, dy) in NEIGHBORS_4 {
                let n = (x + dx, y + dy);
                if set.contains(&n) && seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen.len() == cells.len()
    }

    #[test]
    fn test_starts_prioritize_circulation_then_facade() {
        let s = site(3, 3, vec![(1, 1)], vec![]);
        let g = s.initial_grid();
        let starts = candidate_starts(&s, &g);
        // Four orthogonal neighbors of the corridor first, row-major.
        assert_eq!(&starts[..4], &[(1, 0), (0, 1), (2, 1), (1, 2)]);
        assert_eq!(starts.len(), 8);
    }

    #[test]
    fn test_starts_facade_before_interior() {
        let s = site(3, 3, vec![], vec![]);
        let g = s.initial_grid();
        let starts = candidate_starts(&s, &g);
        assert_eq!(*starts.last().unwrap(), (1, 1));
    }

    #[test]
    fn test_flood_fill_exact_size() {
        let s = site(5, 3, vec![], vec![]);
        let g = s.initial_grid();
        let region = flood_fill(&s, &g, (0, 0), 3).unwrap();
        assert_eq!(region, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_flood_fill_too_small_component() {
        // Column x=1 is circulation, isolating x=0 (3 cells).
        let s = site(3, 3, vec![(1, 0), (1, 1), (1, 2)], vec![]);
        let g = s.initial_grid();
        assert!(flood_fill(&s, &g, (0, 0), 4).is_none());
        assert_eq!(flood_fill(&s, &g, (0, 0), 3).unwrap().len(), 3);
    }

    #[test]
    fn test_flood_fill_skips_partially_blocked() {
        // Fine sub-cell (2,0) lies in coarse (1,0).
        let s = site(3, 1, vec![], vec![(2, 0)]);
        let g = s.initial_grid();
        assert!(flood_fill(&s, &g, (0, 0), 2).is_none());
        let starts = candidate_starts(&s, &g);
        assert!(!starts.contains(&(1, 0)));
    }

    #[test]
    fn test_find_regions_are_distinct_and_connected() {
        let s = site(4, 3, vec![(0, 1)], vec![]);
        let g = s.initial_grid();
        let regions = find_regions(&s, &g, 4);
        assert!(!regions.is_empty());
        let mut keys = HashSet::new();
        for r in &regions {
            assert_eq!(r.len(), 4);
            assert!(is_connected(r));
            let mut k = r.clone();
            k.sort_unstable();
            assert!(keys.insert(k));
        }
    }

    #[test]
    fn test_find_regions_none_when_components_small() {
        let s = site(3, 3, vec![(1, 0), (1, 1), (1, 2)], vec![]);
        let g = s.initial_grid();
        assert!(find_regions(&s, &g, 4).is_empty());
    }

    #[test]
    fn test_occupied_cells_are_not_entered() {
        let s = site(3, 1, vec![], vec![]);
        let mut g = s.initial_grid();
        g.set(1, 0, 1);
        assert!(find_regions(&s, &g, 2).is_empty());
        assert_eq!(find_regions(&s, &g, 1).len(), 2);
    }
}
