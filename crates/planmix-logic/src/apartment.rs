//! Apartment specs and size arithmetic.
//!
//! Sizes are expressed in coarse cells and may carry a 0.5 remainder
//! ("half-cell") that is resolved later on the fine grid. Every check for
//! that remainder goes through [`has_half_remainder`] so region sizing,
//! try budgets and half-cell resolution agree on the same epsilon.

use serde::{Deserialize, Serialize};

/// Tolerance for the 0.5-remainder test.
pub const HALF_EPSILON: f64 = 1e-9;

/// One apartment to place: a type name (e.g. `"3.5p"`) and a size in cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentSpec {
    pub kind: String,
    pub size: f64,
}

impl ApartmentSpec {
    pub fn new(kind: impl Into<String>, size: f64) -> Self {
        Self {
            kind: kind.into(),
            size,
        }
    }

    /// Number of whole coarse cells (`floor(size)`).
    pub fn whole_cells(&self) -> usize {
        whole_cells(self.size)
    }

    pub fn has_half_cell(&self) -> bool {
        has_half_remainder(self.size)
    }
}

/// Whether `size` has a 0.5 fractional remainder.
pub fn has_half_remainder(size: f64) -> bool {
    (size - size.trunc() - 0.5).abs() < HALF_EPSILON
}

/// `floor(size)` as a cell count; negative sizes give 0.
pub fn whole_cells(size: f64) -> usize {
    if size <= 0.0 {
        0
    } else {
        size.floor() as usize
    }
}

/// Room count encoded as the numeric prefix of a type name.
///
/// `"3.5p"` → 3.5, `"4p_duplex"` → 4.0. A name without a numeric prefix
/// counts as zero rooms.
pub fn room_count(kind: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, ch) in kind.char_indices() {
        if ch.is_ascii_digit() {
            end = i + 1;
        } else if ch == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
    }
    kind[..end].parse().unwrap_or(0.0)
}

/// Default minimum facade cells for a type: `max(0, round(rooms - 1.5))`.
pub fn default_facade_requirement(kind: &str) -> usize {
    // Ties go to even: "4p" needs 2 facade cells, "2p" needs none.
    (room_count(kind) - 1.5).round_ties_even().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_remainder() {
        assert!(has_half_remainder(3.5));
        assert!(has_half_remainder(7.5));
        assert!(!has_half_remainder(4.0));
        assert!(!has_half_remainder(4.25));
        assert!(has_half_remainder(0.5 + 2.0 * f64::EPSILON));
    }

    #[test]
    fn test_whole_cells() {
        assert_eq!(whole_cells(7.5), 7);
        assert_eq!(whole_cells(8.0), 8);
        assert_eq!(whole_cells(-1.0), 0);
        assert_eq!(ApartmentSpec::new("2.5p", 5.5).whole_cells(), 5);
    }

    #[test]
    fn test_room_count_prefix() {
        assert_eq!(room_count("3.5p"), 3.5);
        assert_eq!(room_count("5p"), 5.0);
        assert_eq!(room_count("4.5p_duplex"), 4.5);
        assert_eq!(room_count("T1"), 0.0);
        assert_eq!(room_count(""), 0.0);
    }

    #[test]
    fn test_default_facade_requirement() {
        assert_eq!(default_facade_requirement("2.5p"), 1);
        assert_eq!(default_facade_requirement("3.5p"), 2);
        assert_eq!(default_facade_requirement("5.5p"), 4);
        assert_eq!(default_facade_requirement("1.5p"), 0);
        assert_eq!(default_facade_requirement("1p"), 0);
        assert_eq!(default_facade_requirement("2p"), 0);
        assert_eq!(default_facade_requirement("4p"), 2);
        assert_eq!(default_facade_requirement("T1"), 0);
    }
}
