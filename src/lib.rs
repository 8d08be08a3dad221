//! A small multi-layer perceptron trainer.
//!
//! Networks are chains of dense layers over a bias-augmented input, ending in
//! a softmax output layer trained against a cross-entropy loss. See
//! [`feed_forward`](feed_forward/index.html) for an example.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod data;
pub mod error;
pub mod feed_forward;
pub mod layers;
pub mod loss;
pub mod matrix;
pub mod trainer;
pub mod utils;

pub use crate::error::{Error, Result};
