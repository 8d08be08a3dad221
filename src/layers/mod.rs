//! Layers of a feed-forward network.

mod dense;
mod input;

pub use self::dense::{DenseLayer, Kind};
pub use self::input::InputLayer;

use crate::matrix::Mat;

/// What every layer in a chain exposes to its successor.
pub trait Layer {
    /// Returns the number of units this layer outputs.
    fn dim(&self) -> usize;

    /// Returns the activations computed by the last forward pass.
    fn y(&self) -> &Mat;
}
