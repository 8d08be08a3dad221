//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) trained with
//! full-batch gradient descent.
//!
//! # Example
//!
//! Let's fit a network to the XOR function. Inputs carry a leading bias
//! column of ones, and targets are one-hot over two classes:
//!
//! ```
//! # use backprop::feed_forward::*;
//! # use ndarray::array;
//! # fn main() -> backprop::Result<()> {
//! let x = array![[1.0, 0.0, 0.0],
//!                [1.0, 0.0, 1.0],
//!                [1.0, 1.0, 0.0],
//!                [1.0, 1.0, 1.0]];
//! let t = array![[1.0, 0.0],
//!                [0.0, 1.0],
//!                [0.0, 1.0],
//!                [1.0, 0.0]];
//!
//! let mut network = Network::new(Policy::Trick, &[3, 4, 2], 7)?;
//! network.initialize()?;
//! network.feed_data(x, t)?;
//!
//! let step = Hyperparameters::new(0.5).momentum(0.9);
//! for _ in 0..50 {
//!     network.update(&step)?;
//! }
//! network.fprop()?;
//! assert!(network.loss()? >= 0.0);
//! assert!(network.accuracy()? <= 1.0);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::layers::{DenseLayer, InputLayer, Kind, Layer};
use crate::loss;
use crate::matrix::{check_shape, Mat};

use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// How a network initializes and updates its weights.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Uniform initialization scaled by fan-in, plain gradient descent, and
    /// `Kind::Logistic` hidden layers.
    Naive,
    /// Normal initialization with standard deviation `fan_in^-0.5`, momentum
    /// on the hidden layers, and `Kind::Sigmoid` hidden layers.
    Trick,
}

impl Policy {
    /// Returns the kind of hidden layer networks with this policy use.
    pub fn hidden_kind(&self) -> Kind {
        match *self {
            Policy::Naive => Kind::Logistic,
            Policy::Trick => Kind::Sigmoid,
        }
    }
}

/// Parameters of a single `Network::update` step.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate.
    pub eta: f64,
    /// Momentum coefficient. Ignored by `Policy::Naive`.
    #[serde(default)]
    pub mu: f64,
    /// L1 regularization coefficient.
    #[serde(default)]
    pub l1: f64,
    /// L2 regularization coefficient.
    #[serde(default)]
    pub l2: f64,
}

impl Hyperparameters {
    /// Creates parameters with learning rate `eta` and no momentum or
    /// regularization.
    pub fn new(eta: f64) -> Self {
        Hyperparameters {
            eta,
            mu: 0.0,
            l1: 0.0,
            l2: 0.0,
        }
    }

    /// Sets the momentum coefficient.
    pub fn momentum(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Sets the L1 regularization coefficient.
    pub fn l1(mut self, l1: f64) -> Self {
        self.l1 = l1;
        self
    }

    /// Sets the L2 regularization coefficient.
    pub fn l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }
}

/// Loss and accuracy of a network on one batch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// A Feedforward neural network
///
/// The first layer is always an `InputLayer`, the last always a
/// `Kind::Softmax` layer, and every layer in between uses the policy's
/// hidden kind.
#[derive(Debug)]
pub struct Network {
    policy: Policy,
    input: InputLayer,
    layers: Vec<DenseLayer>,
    targets: Option<Mat>,
    fed: bool,
    /// True when the cached activations do not belong to the current batch.
    stale: bool,
    initialized: bool,
    rng: StdRng,
}

impl Network {
    /// Creates a new, uninitialized network whose weights will be drawn from a
    /// generator seeded with `seed`.
    ///
    /// Arguments:
    ///  * `policy` - the initialization and update policy.
    ///  * `sizes` - the number of units in each layer. The first entry is the
    ///              input width including the bias column, the last is the
    ///              number of classes.
    pub fn new(policy: Policy, sizes: &[usize], seed: u64) -> Result<Self> {
        Network::with_rng(policy, sizes, StdRng::seed_from_u64(seed))
    }

    /// Like `Network::new`, drawing weights from the provided generator.
    pub fn with_rng(policy: Policy, sizes: &[usize], rng: StdRng) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::TooFewLayers(sizes.len()));
        }
        if let Some(index) = sizes.iter().position(|&size| size == 0) {
            return Err(Error::EmptyLayer(index));
        }

        let input = InputLayer::new(sizes[0]);
        let mut layers: Vec<DenseLayer> = Vec::with_capacity(sizes.len() - 1);
        for (i, &size) in sizes[1..].iter().enumerate() {
            let kind = if i == sizes.len() - 2 {
                Kind::Softmax
            } else {
                policy.hidden_kind()
            };
            let layer = DenseLayer::new(kind, previous(&input, &layers, i), size);
            layers.push(layer);
        }
        Ok(Network {
            policy,
            input,
            layers,
            targets: None,
            fed: false,
            stale: true,
            initialized: false,
            rng,
        })
    }

    /// Assembles a ready-to-use network from layers that already hold
    /// weights.
    ///
    /// Fails if the layers do not form a valid chain for `policy`: each
    /// layer's fan-in must match its predecessor, the last layer must be a
    /// softmax layer, and all others must be of the policy's hidden kind.
    pub fn from_layers(
        policy: Policy,
        input: InputLayer,
        layers: Vec<DenseLayer>,
        rng: StdRng,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::TooFewLayers(1));
        }
        let last = layers.len() - 1;
        for (i, layer) in layers.iter().enumerate() {
            let prev_dim = previous(&input, &layers, i).dim();
            if layer.fan_in() != prev_dim {
                return Err(Error::DimensionMismatch {
                    expected: layer.fan_in(),
                    actual: prev_dim,
                });
            }
            let expected = if i == last {
                Kind::Softmax
            } else {
                policy.hidden_kind()
            };
            if layer.kind() != expected {
                return Err(Error::UnexpectedLayer {
                    index: i + 1,
                    expected,
                    found: layer.kind(),
                });
            }
        }
        Ok(Network {
            policy,
            input,
            layers,
            targets: None,
            fed: false,
            stale: true,
            initialized: true,
            rng,
        })
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Returns the number of weighted layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn input_layer(&self) -> &InputLayer {
        &self.input
    }

    /// Returns every layer after the input layer.
    pub fn dense_layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Returns the layers between the input and output layers.
    pub fn hidden_layers(&self) -> &[DenseLayer] {
        &self.layers[..self.layers.len() - 1]
    }

    pub fn output_layer(&self) -> &DenseLayer {
        &self.layers[self.layers.len() - 1]
    }

    /// Returns the size of the input layer, bias column included.
    pub fn input_len(&self) -> usize {
        self.input.dim()
    }

    /// Returns the size of the output layer.
    pub fn output_len(&self) -> usize {
        self.output_layer().dim()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the current input batch.
    pub fn x(&self) -> &Mat {
        self.input.y()
    }

    /// Returns the current target batch, if any.
    pub fn targets(&self) -> Option<&Mat> {
        self.targets.as_ref()
    }

    /// Returns the output layer's activations from the last forward pass.
    pub fn prediction(&self) -> &Mat {
        self.output_layer().y()
    }

    /// Returns the number of examples in the current batch.
    pub fn sample_size(&self) -> usize {
        self.input.y().nrows()
    }

    /// Draws fresh weights for every dense layer according to the policy.
    pub fn initialize(&mut self) -> Result<()> {
        for layer in &mut self.layers {
            let fan_in = layer.fan_in() as f64;
            let shape = layer.weights().dim();
            let w = match self.policy {
                Policy::Naive => {
                    Mat::random_using(shape, Uniform::new(-0.5, 0.5), &mut self.rng) / fan_in
                }
                Policy::Trick => {
                    let normal = Normal::new(0.0, fan_in.powf(-0.5))
                        .map_err(|e| Error::Distribution(e.to_string()))?;
                    Mat::random_using(shape, normal, &mut self.rng)
                }
            };
            layer.reinitialize(w);
        }
        self.initialized = true;
        log::debug!(
            "initialized {} dense layers with the {:?} policy",
            self.layers.len(),
            self.policy
        );
        Ok(())
    }

    /// Stores a batch of inputs `x` and one-hot targets `t` for the next
    /// passes.
    ///
    /// `x` must have one column per input unit and `t` one row per example
    /// of `x` and one column per output unit.
    pub fn feed_data(&mut self, x: Mat, t: Mat) -> Result<&mut Self> {
        self.check_input(&x)?;
        check_shape("target batch", &t, (x.nrows(), self.output_len()))?;
        self.input.set_input(x);
        self.targets = Some(t);
        self.fed = true;
        self.stale = true;
        Ok(self)
    }

    /// Feeds `x` forward and returns the predicted class distribution for
    /// each row. Any previously fed targets are discarded.
    pub fn run(&mut self, x: Mat) -> Result<Mat> {
        self.check_input(&x)?;
        self.input.set_input(x);
        self.targets = None;
        self.fed = true;
        self.fprop()?;
        Ok(self.prediction().clone())
    }

    /// Computes every layer's activations, left to right.
    pub fn fprop(&mut self) -> Result<()> {
        self.ensure_ready()?;
        for i in 0..self.layers.len() {
            let (before, after) = self.layers.split_at_mut(i);
            let prev = match before.last() {
                Some(layer) => layer.y(),
                None => self.input.y(),
            };
            after[0].forward(prev);
        }
        self.stale = false;
        Ok(())
    }

    /// Computes the gradient of the mean loss for every layer, right to left.
    ///
    /// Uses the activations of the last `fprop`, running one first if the
    /// current batch has not been fed forward yet.
    pub fn bprop(&mut self) -> Result<()> {
        self.ensure_ready()?;
        if self.stale {
            self.fprop()?;
        }
        self.check_prediction()?;
        let t = self.targets.as_ref().ok_or(Error::NoData)?;
        let n = t.nrows() as f64;
        let last = self.layers.len() - 1;

        let mut delta = self.layers[last].output_delta(t)?;
        for i in (0..self.layers.len()).rev() {
            if i < last {
                delta = delta.dot(&self.layers[i + 1].weights().t()) * &self.layers[i].f_prime();
            }
            let grad = previous(&self.input, &self.layers, i).y().t().dot(&delta) / n;
            self.layers[i].set_gradient(grad);
        }
        Ok(())
    }

    /// Mean cross-entropy of the current prediction against the targets.
    pub fn loss(&self) -> Result<f64> {
        let t = self.check_prediction()?;
        loss::cross_entropy(self.prediction(), t)
    }

    /// Fraction of examples whose predicted class matches the target class.
    pub fn accuracy(&self) -> Result<f64> {
        let t = self.check_prediction()?;
        loss::accuracy(self.prediction(), t)
    }

    /// Performs one gradient descent step on the current batch.
    ///
    /// Under `Policy::Trick` only the hidden layers take momentum steps; the
    /// output layer always uses plain gradient descent.
    pub fn update(&mut self, params: &Hyperparameters) -> Result<()> {
        self.fprop()?;
        self.bprop()?;
        let policy = self.policy;
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            let grad = layer.regularized_gradient(params.l1, params.l2);
            match policy {
                Policy::Trick if i < last => layer.accelerate(params.eta, params.mu, &grad),
                _ => layer.descend(params.eta, &grad),
            }
        }
        Ok(())
    }

    /// Feeds a batch, runs a forward pass, and reports loss and accuracy.
    pub fn evaluate(&mut self, x: Mat, t: Mat) -> Result<Evaluation> {
        self.feed_data(x, t)?;
        self.fprop()?;
        Ok(Evaluation {
            loss: self.loss()?,
            accuracy: self.accuracy()?,
        })
    }

    fn check_input(&self, x: &Mat) -> Result<()> {
        if x.nrows() == 0 {
            return Err(Error::EmptyBatch);
        }
        check_shape("input batch", x, (x.nrows(), self.input_len()))
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.initialized {
            return Err(Error::Uninitialized);
        }
        if !self.fed {
            return Err(Error::NoData);
        }
        Ok(())
    }

    /// Returns the targets if they line up with the current prediction.
    fn check_prediction(&self) -> Result<&Mat> {
        let t = self.targets.as_ref().ok_or(Error::NoData)?;
        check_shape("prediction", self.prediction(), t.dim())?;
        Ok(t)
    }
}

/// Returns the layer feeding dense layer `i`.
fn previous<'a>(input: &'a InputLayer, layers: &'a [DenseLayer], i: usize) -> &'a dyn Layer {
    if i == 0 {
        input as &dyn Layer
    } else {
        &layers[i - 1] as &dyn Layer
    }
}
