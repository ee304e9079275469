//! Utilities for training neural networks.

use std::time::{Duration, Instant};

use log::info;

use crate::data::TrainingSet;
use crate::network::{Network, TrainingReport};
use crate::Result;

/// A builder for training runs over an existing network.
#[derive(Debug)]
pub struct Trainer<'a, N: Network> {
    network: &'a mut N,
    batch_size: usize,
    learning_rate: Option<f64>,
    logging: Logging,
    stop_condition: StopCondition,
}

impl<'a, N: Network> Trainer<'a, N> {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * A batch size of 1 (stochastic updates).
    /// * The network's own learning rate.
    /// * Stops after 1000 epochs.
    /// * Logs on training completion.
    pub fn new(network: &'a mut N) -> Self {
        Trainer {
            network,
            batch_size: 1,
            learning_rate: None,
            logging: Logging::Completion,
            stop_condition: StopCondition::Epochs(1000),
        }
    }

    /// Sets how many samples contribute to each weight update.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
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

    /// Trains the network one epoch at a time until the stop condition is
    /// met or the run is aborted.
    ///
    /// After every epoch the whole training set is re-evaluated; that error
    /// drives logging and `StopCondition::ErrorThreshold`.
    pub fn train(self, examples: &TrainingSet) -> Result<TrainingReport> {
        if let Some(rate) = self.learning_rate {
            self.network.set_parameters(Some(rate), None)?;
        }

        let start_time = Instant::now();
        let mut total = TrainingReport {
            epochs: 0,
            batches: 0,
            last_cost: self.network.last_cost(),
            aborted: false,
        };
        let mut training_error = f64::INFINITY;
        loop {
            let report = self.network.learn(examples, self.batch_size, 1)?;
            total.epochs += report.epochs;
            total.batches += report.batches;
            if report.aborted {
                total.aborted = true;
                total.last_cost = report.last_cost;
                break;
            }
            training_error = self.network.test(examples)?;
            total.last_cost = training_error;

            self.logging.iteration(total.epochs, training_error);
            if self
                .stop_condition
                .should_stop(total.epochs, training_error, start_time)
            {
                break;
            }
        }
        self.logging
            .completion(total.epochs, training_error, start_time);
        Ok(total)
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// A summary will be logged after every `n` epochs
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `epoch` of training.
    fn iteration(&self, epoch: usize, training_error: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && epoch % freq == 0 {
                info!("epoch {}: cost={}", epoch, training_error);
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, epochs: usize, training_error: f64, start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            "ran {} epochs in {:.2} seconds, final cost={}",
            epochs,
            start_time.elapsed().as_secs_f64(),
            training_error
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug)]
pub enum StopCondition {
    /// Stops after the provided number of epochs
    Epochs(usize),
    /// Stops when the training error drops below the provided threshold
    ErrorThreshold(f64),
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
    fn should_stop(&self, epoch: usize, training_error: f64, start_time: Instant) -> bool {
        match *self {
            StopCondition::Epochs(epochs) => epoch >= epochs,
            StopCondition::ErrorThreshold(threshold) => training_error < threshold,
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::Activator;
    use crate::feed_forward::FeedForward;
    use crate::layers::Dense;
    use crate::monitor::Monitor;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;

    fn network() -> FeedForward {
        let mut rng = StdRng::seed_from_u64(11);
        let mut network = FeedForward::new();
        network
            .add(Dense::with_rng(Activator::TanH, 2, 3, &mut rng).unwrap(), None)
            .unwrap();
        network
            .add(Dense::with_rng(Activator::Sigmoid, 3, 1, &mut rng).unwrap(), None)
            .unwrap();
        network
    }

    fn examples() -> TrainingSet {
        TrainingSet::from_pairs([
            (vec![0.0, 0.0], vec![0.1]),
            (vec![1.0, 1.0], vec![0.9]),
        ])
        .unwrap()
    }

    #[test]
    fn stops_after_epochs() {
        let mut network = network();
        let report = Trainer::new(&mut network)
            .batch_size(2)
            .learning_rate(0.2)
            .logging(Logging::Silent)
            .stop_condition(StopCondition::Epochs(7))
            .train(&examples())
            .unwrap();
        assert_eq!(report.epochs, 7);
        assert_eq!(report.batches, 7);
        assert!(!report.aborted);
        assert_eq!(network.learning_rate(), 0.2);
        assert_eq!(network.last_cost(), report.last_cost);
    }

    #[test]
    fn stops_below_threshold() {
        let mut network = network();
        let report = Trainer::new(&mut network)
            .stop_condition(StopCondition::ErrorThreshold(f64::INFINITY))
            .train(&examples())
            .unwrap();
        assert_eq!(report.epochs, 1);
    }

    #[test]
    fn duration_converts() {
        let report = Trainer::new(&mut network())
            .stop_condition(Duration::from_secs(0))
            .logging(Logging::Iterations(1))
            .train(&examples())
            .unwrap();
        assert!(report.epochs >= 1);
    }

    #[test]
    fn abort_ends_the_run() {
        let mut network = network();
        let handle = network.abort_handle();
        network.hooks_mut().register(
            Monitor::Cost,
            3,
            Arc::new(move |_: usize, _: &[f64]| handle.request()),
        );
        let report = Trainer::new(&mut network)
            .stop_condition(StopCondition::Epochs(100))
            .train(&examples())
            .unwrap();
        assert!(report.aborted);
        assert_eq!(report.batches, 3);
        assert_eq!(report.epochs, 1);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let mut network = network();
        assert!(Trainer::new(&mut network)
            .learning_rate(-1.0)
            .train(&examples())
            .is_err());
    }
}
