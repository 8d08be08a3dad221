//! Utilities for training networks with full-batch gradient descent.

use crate::error::Result;
use crate::feed_forward::{Hyperparameters, Network};
use crate::matrix::Mat;

use std::time::{Duration, Instant};

/// A builder for training loops over a single batch.
#[derive(Debug)]
pub struct Trainer {
    hyperparameters: Hyperparameters,
    logging: Logging,
    stop_condition: StopCondition,
}

/// Summary of a finished training run.
#[derive(Copy, Clone, Debug)]
pub struct Report {
    /// Number of update steps taken.
    pub iterations: usize,
    /// Loss on the training batch after the last step.
    pub loss: f64,
    /// Accuracy on the training batch after the last step.
    pub accuracy: f64,
    pub elapsed: Duration,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * Stops after 1000 training iterations.
    /// * Logs on training completion.
    pub fn new(hyperparameters: Hyperparameters) -> Self {
        Trainer {
            hyperparameters,
            logging: Logging::Completion,
            stop_condition: StopCondition::Iterations(1000),
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Trains `network` on the inputs `x` and one-hot targets `t`.
    ///
    /// The network must already be initialized. Every iteration is one
    /// `Network::update` over the whole batch.
    pub fn train(&self, network: &mut Network, x: Mat, t: Mat) -> Result<Report> {
        network.feed_data(x, t)?;

        let start_time = Instant::now();
        let mut iteration = 0;
        loop {
            network.update(&self.hyperparameters)?;
            iteration += 1;

            // Loss of the prediction this step was computed from.
            let loss = network.loss()?;
            self.logging.iteration(iteration, loss);
            if self.stop_condition.should_stop(iteration, loss, start_time) {
                break;
            }
        }

        network.fprop()?;
        let report = Report {
            iterations: iteration,
            loss: network.loss()?,
            accuracy: network.accuracy()?,
            elapsed: start_time.elapsed(),
        };
        self.logging.completion(&report);
        Ok(report)
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// A summary will be logged after every `n` training iterations
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of training.
    fn iteration(&self, iteration: usize, loss: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                log::info!("iteration {}: loss={:.6}", iteration, loss);
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, report: &Report) {
        if let Logging::Silent = *self {
            return;
        }
        log::info!(
            "ran {} iterations in {:.2} seconds; loss={:.6} accuracy={:.4}",
            report.iterations,
            report.elapsed.as_secs_f64(),
            report.loss,
            report.accuracy
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug)]
pub enum StopCondition {
    /// Stops after the provided number of training iterations
    Iterations(usize),
    /// Stops when the training loss drops below the provided threshold
    LossThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete.
    fn should_stop(&self, iteration: usize, loss: f64, start_time: Instant) -> bool {
        match *self {
            StopCondition::Iterations(iterations) => iteration >= iterations,
            StopCondition::LossThreshold(threshold) => loss < threshold,
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::feed_forward::Policy;
    use ndarray::array;

    fn xor() -> (Mat, Mat) {
        let x = array![
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0]
        ];
        let t = array![[1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
        (x, t)
    }

    #[test]
    fn stops_after_iterations() {
        let (x, t) = xor();
        let mut network = Network::new(Policy::Naive, &[3, 2, 2], 0).unwrap();
        network.initialize().unwrap();
        let report = Trainer::new(Hyperparameters::new(0.1))
            .logging(Logging::Silent)
            .stop_condition(StopCondition::Iterations(7))
            .train(&mut network, x, t)
            .unwrap();
        assert_eq!(report.iterations, 7);
        assert!(report.loss.is_finite());
    }

    #[test]
    fn stops_below_loss_threshold() {
        let (x, t) = xor();
        let mut network = Network::new(Policy::Trick, &[3, 2], 0).unwrap();
        network.initialize().unwrap();
        let report = Trainer::new(Hyperparameters::new(0.1))
            .logging(Logging::Iterations(1))
            .stop_condition(StopCondition::LossThreshold(10.0))
            .train(&mut network, x, t)
            .unwrap();
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn stops_after_duration() {
        let (x, t) = xor();
        let mut network = Network::new(Policy::Naive, &[3, 2], 0).unwrap();
        network.initialize().unwrap();
        let report = Trainer::new(Hyperparameters::new(0.1))
            .logging(Logging::Silent)
            .stop_condition(Duration::from_millis(0))
            .train(&mut network, x, t)
            .unwrap();
        assert!(report.iterations >= 1);
    }

    #[test]
    fn learns_xor() {
        let (x, t) = xor();
        let mut network = Network::new(Policy::Trick, &[3, 8, 2], 3).unwrap();
        network.initialize().unwrap();
        let report = Trainer::new(Hyperparameters::new(0.5).momentum(0.9))
            .logging(Logging::Silent)
            .stop_condition(StopCondition::Iterations(3000))
            .train(&mut network, x, t)
            .unwrap();
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn requires_initialized_network() {
        let (x, t) = xor();
        let mut network = Network::new(Policy::Naive, &[3, 2], 0).unwrap();
        match Trainer::new(Hyperparameters::new(0.1)).train(&mut network, x, t) {
            Err(Error::Uninitialized) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
