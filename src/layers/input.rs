use crate::layers::Layer;
use crate::matrix::Mat;

/// The first layer of a network. It holds the current input batch and has no
/// weights.
#[derive(Clone, Debug)]
pub struct InputLayer {
    dim: usize,
    y: Mat,
}

impl InputLayer {
    /// Creates an input layer for batches with `dim` columns, the bias column
    /// included.
    pub fn new(dim: usize) -> Self {
        InputLayer {
            dim,
            y: Mat::zeros((0, dim)),
        }
    }

    pub(crate) fn set_input(&mut self, x: Mat) {
        debug_assert_eq!(x.ncols(), self.dim);
        self.y = x;
    }
}

impl Layer for InputLayer {
    fn dim(&self) -> usize {
        self.dim
    }

    fn y(&self) -> &Mat {
        &self.y
    }
}
