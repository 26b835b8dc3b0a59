//! Cross-apartment shape similarity filter.
//!
//! Once one apartment is placed, every later candidate must resemble the
//! mean shape of those already placed. Strictness grows with the shape
//! weight, and tightens further while the placed shapes are still nearly
//! identical.

use crate::grid::Cell;
use crate::shape::{mean_descriptors, shape_descriptors, shape_variance, ShapeDescriptors};

/// Distance threshold before weighting.
pub const BASE_THRESHOLD: f64 = 1.0;
/// Below this placed-set variance the threshold is tightened.
pub const LOW_VARIANCE: f64 = 0.01;
/// Floor of the tightened threshold.
pub const MIN_TIGHT_THRESHOLD: f64 = 0.15;

/// Acceptable descriptor distance for the given weight and placed-set variance.
pub fn distance_threshold(weight: f64, current_variance: f64) -> f64 {
    let strictness = (100.0 / weight).clamp(0.1, 2.0);
    let threshold = BASE_THRESHOLD * strictness;
    if current_variance < LOW_VARIANCE {
        (threshold * 0.7).max(MIN_TIGHT_THRESHOLD)
    } else {
        threshold
    }
}

/// Keep candidates close to the placed apartments' mean shape, nearest first.
///
/// With nothing placed, candidates pass through untouched. An empty result
/// means this branch cannot continue.
pub fn filter_similar(
    candidates: Vec<Vec<Cell>>,
    placed: &[ShapeDescriptors],
    weight: f64,
) -> Vec<Vec<Cell>> {
    if candidates.is_empty() || placed.is_empty() {
        return candidates;
    }

    let mean = mean_descriptors(placed);
    let threshold = distance_threshold(weight, shape_variance(placed));

    let mut scored: Vec<(f64, Vec<Cell>)> = candidates
        .into_iter()
        .filter_map(|cells| {
            let distance = shape_descriptors(&cells).distance(&mean);
            (distance <= threshold).then_some((distance, cells))
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, cells)| cells).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(x: i32, y: i32) -> Vec<Cell> {
        vec![(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
    }

    fn line_at(x: i32, y: i32) -> Vec<Cell> {
        vec![(x, y), (x + 1, y), (x + 2, y), (x + 3, y)]
    }

    #[test]
    fn test_threshold_formula() {
        assert_eq!(distance_threshold(100.0, 1.0), 1.0);
        assert_eq!(distance_threshold(10.0, 1.0), 2.0);
        assert_eq!(distance_threshold(1000.0, 1.0), 0.1);
        assert!((distance_threshold(100.0, 0.0) - 0.7).abs() < 1e-12);
        assert_eq!(distance_threshold(1000.0, 0.0), MIN_TIGHT_THRESHOLD);
    }

    #[test]
    fn test_first_placement_unfiltered() {
        let candidates = vec![line_at(0, 0), square_at(0, 0)];
        let out = filter_similar(candidates.clone(), &[], 1000.0);
        assert_eq!(out, candidates);
    }

    #[test]
    fn test_rejects_dissimilar_shapes() {
        let placed = [shape_descriptors(&square_at(0, 0))];
        let out = filter_similar(vec![line_at(0, 3)], &placed, 100.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_keeps_close_shapes_sorted_by_distance() {
        let placed = [shape_descriptors(&square_at(0, 0))];
        // S tetromino: distance ~1.22 from the square; L tetromino: ~2.76.
        let s_shape = vec![(6, 0), (7, 0), (5, 1), (6, 1)];
        let l_shape = vec![(0, 5), (1, 5), (0, 6), (0, 7)];
        let candidates = vec![s_shape.clone(), l_shape, square_at(3, 3)];
        // Weight 50 → threshold 2.0, tightened to 1.4 while variance is 0.
        let out = filter_similar(candidates, &placed, 50.0);
        assert_eq!(out, vec![square_at(3, 3), s_shape]);
    }
}
