//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a grid measure to f64 for distance math.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Widen an unsigned counter into the signed score domain, saturating at `i64::MAX`.
#[must_use]
pub fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Widen a step counter into the signed score domain.
#[must_use]
pub fn steps_to_i64(value: u32) -> i64 {
    i64::from(value)
}

/// Euclidean distance between two grid cells.
#[must_use]
pub fn euclidean(a: (usize, usize), b: (usize, usize)) -> f64 {
    let dr = usize_to_f64(a.0.abs_diff(b.0));
    let dc = usize_to_f64(a.1.abs_diff(b.1));
    dr.hypot(dc)
}
