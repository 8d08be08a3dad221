//! Dense matrix helpers shared by layers and data sets.

use crate::error::{Error, Result};

use ndarray::{s, Array2};

/// A row-major matrix of `f64`, one example per row.
pub type Mat = Array2<f64>;

/// Returns a copy of `x` with a column of ones prepended, so that weight
/// matrices can carry the bias as their first row.
pub fn prepend_bias(x: &Mat) -> Mat {
    let mut out = Mat::ones((x.nrows(), x.ncols() + 1));
    out.slice_mut(s![.., 1..]).assign(x);
    out
}

/// Encodes `labels` as rows with a single 1 at the label's index.
pub fn one_hot(labels: &[usize], classes: usize) -> Result<Mat> {
    let mut out = Mat::zeros((labels.len(), classes));
    for (row, &label) in labels.iter().enumerate() {
        if label >= classes {
            return Err(Error::Data(format!(
                "label {} is out of range for {} classes",
                label, classes
            )));
        }
        out[[row, label]] = 1.0;
    }
    Ok(out)
}

/// Fails with `Error::ShapeMismatch` unless `m` has exactly `expected` shape.
pub fn check_shape(what: &'static str, m: &Mat, expected: (usize, usize)) -> Result<()> {
    if m.dim() != expected {
        return Err(Error::ShapeMismatch {
            what,
            expected,
            actual: m.dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bias_is_column_zero() {
        let x = array![[2.0, 3.0], [4.0, 5.0]];
        assert_eq!(prepend_bias(&x), array![[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]]);
    }

    #[test]
    fn one_hot_rows() {
        let t = one_hot(&[2, 0], 3).unwrap();
        assert_eq!(t, array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn one_hot_rejects_large_label() {
        assert!(one_hot(&[3], 3).is_err());
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let m = Mat::zeros((2, 3));
        assert!(check_shape("m", &m, (2, 3)).is_ok());
        match check_shape("m", &m, (3, 2)) {
            Err(Error::ShapeMismatch { actual, .. }) => assert_eq!(actual, (2, 3)),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
