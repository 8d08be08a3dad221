//! Cross-entropy loss and classification accuracy over a batch.

use crate::error::Result;
use crate::matrix::{check_shape, Mat};
use crate::utils::{argmax, prevent_nan, sane_log};

use itertools::Itertools;

/// Mean over rows of `-sum(t * log(y))`.
///
/// Zero predictions go through [`sane_log`] and any `NaN` term counts as zero,
/// so the result is always finite for finite targets. Fails unless `y` and
/// `t` have the same shape.
pub fn cross_entropy(y: &Mat, t: &Mat) -> Result<f64> {
    check_shape("prediction", y, t.dim())?;
    if t.nrows() == 0 {
        return Ok(0.0);
    }
    let total: f64 = t
        .iter()
        .zip_eq(y.iter())
        .map(|(&t, &y)| prevent_nan(t * sane_log(y), 0.0))
        .sum();
    Ok(prevent_nan(-total / t.nrows() as f64, 0.0))
}

/// Fraction of rows whose largest prediction is at the target's hot index.
pub fn accuracy(y: &Mat, t: &Mat) -> Result<f64> {
    check_shape("prediction", y, t.dim())?;
    if t.nrows() == 0 {
        return Ok(0.0);
    }
    let correct = y
        .outer_iter()
        .zip(t.outer_iter())
        .filter(|(y, t)| argmax(y.iter()) == argmax(t.iter()))
        .count();
    Ok(correct as f64 / t.nrows() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn loss_of_confident_correct_prediction_is_zero() {
        let t = array![[0.0, 1.0], [1.0, 0.0]];
        assert_abs_diff_eq!(cross_entropy(&t, &t).unwrap(), 0.0);
    }

    #[test]
    fn loss_matches_hand_computation() {
        let y = array![[0.25, 0.75], [0.5, 0.5]];
        let t = array![[0.0, 1.0], [1.0, 0.0]];
        let expected = -(0.75f64.ln() + 0.5f64.ln()) / 2.0;
        assert_abs_diff_eq!(cross_entropy(&y, &t).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn loss_is_finite_when_prediction_underflows() {
        let y = array![[0.0, 1.0], [1.0, 0.0]];
        let t = array![[1.0, 0.0], [1.0, 0.0]];
        let loss = cross_entropy(&y, &t).unwrap();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }

    #[test]
    fn nan_predictions_do_not_propagate() {
        let y = array![[f64::NAN, 0.5], [0.5, 0.5]];
        let t = array![[1.0, 0.0], [1.0, 0.0]];
        let loss = cross_entropy(&y, &t).unwrap();
        assert!(!loss.is_nan());
        assert_abs_diff_eq!(loss, -(0.5f64.ln()) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn loss_is_non_negative() {
        let y = array![[0.2, 0.3, 0.5], [0.9, 0.05, 0.05]];
        let t = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(cross_entropy(&y, &t).unwrap() >= 0.0);
    }

    #[test]
    fn perfect_accuracy() {
        let t = array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        assert_eq!(accuracy(&t, &t).unwrap(), 1.0);
    }

    #[test]
    fn accuracy_counts_argmax_matches() {
        let y = array![[0.4, 0.6], [0.8, 0.2], [0.9, 0.1], [0.3, 0.7]];
        let t = array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        assert_eq!(accuracy(&y, &t).unwrap(), 0.5);
    }

    #[test]
    fn accuracy_ignores_scale() {
        let y = array![[0.4, 0.6], [0.8, 0.2], [0.9, 0.1]];
        let t = array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        assert_eq!(accuracy(&(&y * 17.0), &t).unwrap(), accuracy(&y, &t).unwrap());
        assert_eq!(accuracy(&(&y * 0.001), &t).unwrap(), accuracy(&y, &t).unwrap());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let y = array![[0.5, 0.5], [0.5, 0.5], [0.5, 0.5]];
        let t = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(cross_entropy(&y, &t).is_err());
        assert!(accuracy(&y, &t).is_err());
    }

    #[test]
    fn transposed_prediction_is_rejected() {
        let y = array![[0.2, 0.8, 0.5], [0.8, 0.2, 0.5]];
        let t = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        match cross_entropy(&y, &t) {
            Err(Error::ShapeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, (3, 2));
                assert_eq!(actual, (2, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(accuracy(&y, &t).is_err());
    }
}
