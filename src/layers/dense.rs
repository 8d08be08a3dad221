use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::matrix::Mat;
use crate::utils::sign;

use ndarray::Zip;

/// The flavours of fully connected layer a network can contain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// Sigmoid hidden layer updated by plain gradient descent.
    Logistic,
    /// Sigmoid hidden layer that carries a momentum buffer.
    Sigmoid,
    /// Softmax output layer.
    Softmax,
}

impl Kind {
    /// Returns the activation function used by this kind of layer.
    pub fn activator(&self) -> Activator {
        match *self {
            Kind::Logistic | Kind::Sigmoid => Activator::Sigmoid,
            Kind::Softmax => Activator::Softmax,
        }
    }

    /// Returns true if layers of this kind own a momentum buffer.
    pub fn has_momentum(&self) -> bool {
        *self == Kind::Sigmoid
    }
}

/// A fully connected layer of a neural network
///
/// The weights are stored as a single matrix with one column per unit. Row 0
/// of the first layer's weights multiplies the input's bias column.
#[derive(Clone, Debug)]
pub struct DenseLayer {
    kind: Kind,
    /// Weights, shaped `(predecessor dim, units)`.
    w: Mat,
    /// Pre-activations from the last forward pass.
    a: Mat,
    /// Activations from the last forward pass.
    y: Mat,
    /// Gradient of the mean loss with respect to `w`.
    grad: Mat,
    /// Momentum buffer, present only for `Kind::Sigmoid`.
    v: Option<Mat>,
}

impl DenseLayer {
    /// Creates a layer of `size` units on top of `prev`. The weights are all
    /// zero until the owning network initializes them.
    pub fn new(kind: Kind, prev: &dyn Layer, size: usize) -> Self {
        DenseLayer::build(kind, Mat::zeros((prev.dim(), size)))
    }

    /// Creates a layer on top of `prev` with the given weights.
    ///
    /// Fails if `w` does not have one row per unit of `prev`.
    pub fn from_weights(kind: Kind, prev: &dyn Layer, w: Mat) -> Result<Self> {
        if w.nrows() != prev.dim() {
            return Err(Error::DimensionMismatch {
                expected: w.nrows(),
                actual: prev.dim(),
            });
        }
        Ok(DenseLayer::build(kind, w))
    }

    fn build(kind: Kind, w: Mat) -> Self {
        let (fan_in, size) = w.dim();
        DenseLayer {
            kind,
            a: Mat::zeros((0, size)),
            y: Mat::zeros((0, size)),
            grad: Mat::zeros((fan_in, size)),
            v: if kind.has_momentum() {
                Some(Mat::zeros((fan_in, size)))
            } else {
                None
            },
            w,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the number of inputs to this layer.
    pub fn fan_in(&self) -> usize {
        self.w.nrows()
    }

    pub fn weights(&self) -> &Mat {
        &self.w
    }

    pub fn pre_activation(&self) -> &Mat {
        &self.a
    }

    pub fn gradient(&self) -> &Mat {
        &self.grad
    }

    pub fn velocity(&self) -> Option<&Mat> {
        self.v.as_ref()
    }

    /// Applies the layer's nonlinearity to its pre-activations.
    pub fn f(&self) -> Mat {
        self.kind.activator().f(&self.a)
    }

    /// Local derivative of the nonlinearity, in terms of the current output.
    pub fn f_prime(&self) -> Mat {
        self.kind.activator().fprime(&self.y)
    }

    /// Returns `y - t`, the gradient of cross-entropy composed with softmax
    /// with respect to the pre-activations.
    pub fn output_delta(&self, t: &Mat) -> Result<Mat> {
        if self.kind != Kind::Softmax {
            return Err(Error::NotAnOutputLayer(self.kind));
        }
        Ok(&self.y - t)
    }

    /// Computes `a = prev @ w` and `y = f(a)`.
    pub(crate) fn forward(&mut self, prev: &Mat) {
        self.a = prev.dot(&self.w);
        self.y = self.f();
    }

    pub(crate) fn set_gradient(&mut self, grad: Mat) {
        debug_assert_eq!(grad.dim(), self.w.dim());
        self.grad = grad;
    }

    /// Replaces the weights and clears the momentum buffer.
    pub(crate) fn reinitialize(&mut self, w: Mat) {
        debug_assert_eq!(w.dim(), self.w.dim());
        self.w = w;
        if let Some(v) = self.v.as_mut() {
            v.fill(0.0);
        }
    }

    /// Returns `grad + l1 * sign(w) + 2 * l2 * w`.
    pub fn regularized_gradient(&self, l1: f64, l2: f64) -> Mat {
        let mut grad = self.grad.clone();
        Zip::from(&mut grad)
            .and(&self.w)
            .for_each(|g, &w| *g += l1 * sign(w) + 2.0 * l2 * w);
        grad
    }

    /// Plain gradient descent: `w -= eta * grad`.
    pub(crate) fn descend(&mut self, eta: f64, grad: &Mat) {
        self.w.scaled_add(-eta, grad);
    }

    /// Momentum step: `v = mu * v - eta * grad; w += v`.
    ///
    /// Layers without a momentum buffer fall back to `descend`.
    pub(crate) fn accelerate(&mut self, eta: f64, mu: f64, grad: &Mat) {
        match self.v.as_mut() {
            Some(v) => {
                *v *= mu;
                v.scaled_add(-eta, grad);
                self.w += &*v;
            }
            None => self.descend(eta, grad),
        }
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut Mat {
        &mut self.w
    }
}

impl Layer for DenseLayer {
    fn dim(&self) -> usize {
        self.w.ncols()
    }

    fn y(&self) -> &Mat {
        &self.y
    }
}
