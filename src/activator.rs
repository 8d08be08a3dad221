//! Activation function types.

use crate::matrix::Mat;

use ndarray::Axis;

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types, applied to a whole batch of pre-activations at once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// Logistic sigmoid, applied elementwise.
    Sigmoid,
    /// Softmax over each row.
    Softmax,
}

impl Activator {
    /// Evaluates `f(a)` for every row of `a`.
    pub fn f(&self, a: &Mat) -> Mat {
        match *self {
            Activator::Sigmoid => a.mapv(sigmoid),
            Activator::Softmax => {
                let mut y = a.to_owned();
                for mut row in y.axis_iter_mut(Axis(0)) {
                    // Shift by the row max so exp() cannot overflow.
                    let max = row.fold(f64::NEG_INFINITY, |m, &x| m.max(x));
                    row.mapv_inplace(|x| (x - max).exp());
                    let sum = row.sum();
                    row /= sum;
                }
                y
            }
        }
    }

    /// Evaluates the derivative `f'(a)` given the *output* `y = f(a)`.
    ///
    /// For softmax this is only the diagonal of the Jacobian. Output layers
    /// never need it, since their delta has a closed form against the
    /// cross-entropy loss.
    pub fn fprime(&self, y: &Mat) -> Mat {
        y.mapv(|y| y * (1.0 - y))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn sigmoid_values() {
        let y = Activator::Sigmoid.f(&array![[0.0, 1000.0, -1000.0]]);
        assert_eq!(y, array![[0.5, 1.0, 0.0]]);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let y = Activator::Softmax.f(&array![[1.0, 2.0, 3.0], [-1.0, 0.0, 1.0]]);
        for row in y.outer_iter() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(y[[0, 2]], y[[1, 2]], epsilon = 1e-12);
    }

    #[test]
    fn softmax_survives_large_inputs() {
        let y = Activator::Softmax.f(&array![[1000.0, 1000.0], [800.0, -800.0]]);
        assert!(y.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(y[[0, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(y[[1, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_derivative_from_output() {
        let d = Activator::Sigmoid.fprime(&array![[0.5, 0.0, 1.0]]);
        assert_eq!(d, array![[0.25, 0.0, 0.0]]);
    }
}
