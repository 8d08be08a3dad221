//! Error types.

use crate::layers::Kind;

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a network needs an input and an output layer, got {0} layer sizes")]
    TooFewLayers(usize),

    #[error("layer {0} has no units")]
    EmptyLayer(usize),

    #[error("layer expects {expected} inputs but its predecessor produces {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("batch contains no examples")]
    EmptyBatch,

    #[error("expected a {expected:?} layer at position {index}, found {found:?}")]
    UnexpectedLayer {
        index: usize,
        expected: Kind,
        found: Kind,
    },

    #[error("{0:?} layers do not define an output delta")]
    NotAnOutputLayer(Kind),

    #[error("network weights have not been initialized")]
    Uninitialized,

    #[error("no data has been fed to the network")]
    NoData,

    #[error("invalid weight distribution: {0}")]
    Distribution(String),

    #[error("invalid data set: {0}")]
    Data(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
