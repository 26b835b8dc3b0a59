//! Region geometry: compactness and shape descriptors.
//!
//! All measures are axis-aligned; a region and its 90° rotation generally
//! get different descriptors.

use crate::grid::{Cell, NEIGHBORS_4};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Floor for the smaller second moment in [`ShapeDescriptors::moment_ratio`].
pub const MOMENT_EPSILON: f64 = 1e-6;

/// Geometric fingerprint of a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptors {
    /// Long side over short side of the bounding box (≥ 1).
    pub aspect_ratio: f64,
    /// Exposed edges per cell.
    pub normalized_perimeter: f64,
    /// Larger over smaller second moment about the centroid (≥ 1 unless both vanish).
    pub moment_ratio: f64,
}

impl Default for ShapeDescriptors {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            normalized_perimeter: 0.0,
            moment_ratio: 1.0,
        }
    }
}

impl ShapeDescriptors {
    pub fn as_array(&self) -> [f64; 3] {
        [self.aspect_ratio, self.normalized_perimeter, self.moment_ratio]
    }

    /// Euclidean distance over the raw (unnormalized) descriptor values.
    pub fn distance(&self, other: &[f64; 3]) -> f64 {
        self.as_array()
            .iter()
            .zip(other)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Number of internal 4-adjacency edges, each counted once.
pub fn compactness(cells: &[Cell]) -> u32 {
    let set: HashSet<Cell> = cells.iter().copied().collect();
    let mut contacts = 0u32;
    for &(x, y) in cells {
        // Right and down only, so every shared edge is seen once.
        if set.contains(&(x + 1, y)) {
            contacts += 1;
        }
        if set.contains(&(x, y + 1)) {
            contacts += 1;
        }
    }
    contacts
}

/// Number of region-to-outside 4-adjacent edges.
pub fn exposed_edges(cells: &[Cell]) -> usize {
    let set: HashSet<Cell> = cells.iter().copied().collect();
    cells
        .iter()
        .map(|&(x, y)| {
            NEIGHBORS_4
                .iter()
                .filter(|(dx, dy)| !set.contains(&(x + dx, y + dy)))
                .count()
        })
        .sum()
}

/// Compute the descriptor triple of a region.
pub fn shape_descriptors(cells: &[Cell]) -> ShapeDescriptors {
    if cells.is_empty() {
        return ShapeDescriptors::default();
    }

    let min_x = cells.iter().map(|c| c.0).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.0).max().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.1).min().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.1).max().unwrap_or(0);
    let w = (max_x - min_x + 1) as f64;
    let h = (max_y - min_y + 1) as f64;
    let aspect_ratio = w.max(h) / w.min(h).max(1.0);

    let area = cells.len() as f64;
    let normalized_perimeter = exposed_edges(cells) as f64 / area;

    let cx = cells.iter().map(|c| c.0 as f64).sum::<f64>() / area;
    let cy = cells.iter().map(|c| c.1 as f64).sum::<f64>() / area;
    let ixx: f64 = cells.iter().map(|c| (c.1 as f64 - cy).powi(2)).sum();
    let iyy: f64 = cells.iter().map(|c| (c.0 as f64 - cx).powi(2)).sum();
    let moment_ratio = ixx.max(iyy) / ixx.min(iyy).max(MOMENT_EPSILON);

    ShapeDescriptors {
        aspect_ratio,
        normalized_perimeter,
        moment_ratio,
    }
}

/// Per-axis mean of a descriptor set.
pub fn mean_descriptors(descriptors: &[ShapeDescriptors]) -> [f64; 3] {
    let mut mean = [0.0; 3];
    if descriptors.is_empty() {
        return mean;
    }
    for d in descriptors {
        for (m, v) in mean.iter_mut().zip(d.as_array()) {
            *m += v;
        }
    }
    let n = descriptors.len() as f64;
    mean.map(|m| m / n)
}

/// Mean over the three axes of each axis's population variance.
/// Zero for one descriptor or none.
pub fn shape_variance(descriptors: &[ShapeDescriptors]) -> f64 {
    if descriptors.len() <= 1 {
        return 0.0;
    }
    let mean = mean_descriptors(descriptors);
    let n = descriptors.len() as f64;
    let mut total = 0.0;
    for (axis, m) in mean.iter().enumerate() {
        let var = descriptors
            .iter()
            .map(|d| (d.as_array()[axis] - m).powi(2))
            .sum::<f64>()
            / n;
        total += var;
    }
    total / 3.0
}
