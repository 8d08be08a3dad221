//! Numeric helpers for the places where degenerate values show up.

use itertools::Itertools;
use std::cmp::Ordering;

/// Natural logarithm that never returns `-inf`.
///
/// Inputs at or below zero are clamped to the smallest positive normal `f64`,
/// so `sane_log(0.0)` is roughly `-708.4`. `NaN` is passed through untouched
/// so that [`prevent_nan`] can still see it.
pub fn sane_log(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    x.max(f64::MIN_POSITIVE).ln()
}

/// Returns `fallback` if `value` is `NaN`, otherwise `value`.
pub fn prevent_nan(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value
    }
}

/// Sign of `x`, with `sign(0.0) == 0.0`.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Index of the largest value. Ties resolve to the first occurrence, and an
/// empty input yields 0.
pub fn argmax<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .position_min_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sane_log_is_finite_at_zero() {
        let y = sane_log(0.0);
        assert!(y.is_finite());
        assert!(y < -700.0);
        assert_eq!(sane_log(1.0), 0.0);
    }

    #[test]
    fn sane_log_keeps_nan() {
        assert!(sane_log(f64::NAN).is_nan());
    }

    #[test]
    fn prevent_nan_replaces_only_nan() {
        assert_eq!(prevent_nan(f64::NAN, 0.0), 0.0);
        assert_eq!(prevent_nan(-3.5, 0.0), -3.5);
        assert_eq!(prevent_nan(f64::INFINITY, 0.0), f64::INFINITY);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-1e-9), -1.0);
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&[] as &[f64]), 0);
    }
}
