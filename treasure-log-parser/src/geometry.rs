//! Half-of-environment comparisons
//!
//! The environment is split at the center's planar y coordinate. A point
//! exactly on the split line belongs to the upper (`>=`) half.

use crate::types::Point;

/// True when both y coordinates fall in the same half of the environment
pub fn same_side(a: f64, b: f64, center: f64) -> bool {
    (a >= center) == (b >= center)
}

/// `same_side` over optional points; unknown when any input is unknown
pub fn same_side_of(a: Option<Point>, b: Option<Point>, center: Option<Point>) -> Option<bool> {
    Some(same_side(a?.y, b?.y, center?.y))
}
