//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! # Example
//!
//! Let's train a small network on the XOR function:
//!
//! ```
//! # use netdesign::prelude::*;
//! # use rand::{rngs::StdRng, SeedableRng};
//! // Create examples of the XOR function
//! let examples = TrainingSet::from_pairs([
//!     (vec![0.0, 0.0], vec![0.0]),
//!     (vec![0.0, 1.0], vec![1.0]),
//!     (vec![1.0, 0.0], vec![1.0]),
//!     (vec![1.0, 1.0], vec![0.0]),
//! ])?;
//!
//! let mut rng = StdRng::seed_from_u64(3);
//! let mut network = FeedForward::new();
//! network.add(Dense::with_rng(Activator::TanH, 2, 4, &mut rng)?, None)?;
//! network.add(Dense::with_rng(Activator::Sigmoid, 4, 1, &mut rng)?, None)?;
//! network.set_parameters(Some(0.5), Some(CostFunction::MeanSquare))?;
//!
//! let before = network.test(&examples)?;
//! let report = network.learn(&examples, 4, 500)?;
//! assert_eq!(report.batches, 500);
//! assert!(network.test(&examples)? < before);
//! # Ok::<(), netdesign::Error>(())
//! ```

use std::mem;

use itertools::Itertools;
use log::{debug, info, warn};
use ndarray::{Array1, ArrayView1};

use crate::cost::{Cost, CostFunction};
use crate::data::TrainingSet;
use crate::layers::{Dense, Gradient, Layer, LayerId};
use crate::monitor::{Hooks, Monitor};
use crate::network::{AbortHandle, Network, TrainingReport, TrainingState};
use crate::utils::ZeroOut;
use crate::{Error, Result};

/// A Feedforward neural network
#[derive(Debug)]
pub struct FeedForward<L: Layer = Dense> {
    /// Evaluated in order; layer `i` feeds layer `i + 1`.
    layers: Vec<L>,
    cost_function: CostFunction,
    cost: Box<dyn Cost>,
    learning_rate: f64,
    last_cost: f64,
    abort: AbortHandle,
    hooks: Hooks,
    /// Batches trained over the network's lifetime.
    batches_seen: usize,
    state: TrainingState,
}

impl<L: Layer> Default for FeedForward<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Layer> FeedForward<L> {
    /// Creates an empty network with a learning rate of 0.1 and a mean
    /// square cost.
    pub fn new() -> Self {
        let cost_function = CostFunction::default();
        FeedForward {
            layers: Vec::new(),
            cost_function,
            cost: cost_function.strategy(),
            learning_rate: 0.1,
            last_cost: 0.0,
            abort: AbortHandle::new(),
            hooks: Hooks::new(),
            batches_seen: 0,
            state: TrainingState::Idle,
        }
    }

    /// Inserts `layer` at `position`, or appends it when `position` is
    /// `None`.
    ///
    /// The adjacency of dimensions is not checked here; see
    /// `validate_topology`.
    pub fn add(&mut self, layer: L, position: Option<usize>) -> Result<()> {
        match position {
            None => self.layers.push(layer),
            Some(position) if position <= self.layers.len() => {
                self.layers.insert(position, layer)
            }
            Some(position) => {
                return Err(Error::PositionOutOfRange {
                    position,
                    len: self.layers.len(),
                })
            }
        }
        Ok(())
    }

    /// Removes and returns the layer at `position`.
    pub fn remove(&mut self, position: usize) -> Result<L> {
        if position >= self.layers.len() {
            return Err(Error::PositionOutOfRange {
                position,
                len: self.layers.len(),
            });
        }
        Ok(self.layers.remove(position))
    }

    /// Removes the layer with identity `id`, returning where it was.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<usize> {
        let position = self
            .layers
            .iter()
            .position(|layer| layer.id() == id)
            .ok_or(Error::UnknownLayer(id))?;
        self.layers.remove(position);
        Ok(position)
    }

    pub fn layer(&self, position: usize) -> Option<&L> {
        self.layers.get(position)
    }

    pub fn layer_mut(&mut self, position: usize) -> Option<&mut L> {
        self.layers.get_mut(position)
    }

    pub fn layers(&self) -> &[L] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> Option<usize> {
        self.layers.first().map(|layer| layer.input_len())
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> Option<usize> {
        self.layers.last().map(|layer| layer.output_len())
    }

    /// Lists every structural problem that would stop the network from
    /// running. An empty list means the topology is sound.
    pub fn validate_topology(&self) -> Vec<Error> {
        if self.layers.is_empty() {
            return vec![Error::EmptyNetwork];
        }
        self.layers
            .iter()
            .tuple_windows()
            .filter(|(prev, next)| prev.output_len() != next.input_len())
            .map(|(prev, next)| Error::DimensionMismatch {
                what: "adjacent layers",
                got: next.input_len(),
                expected: prev.output_len(),
            })
            .collect()
    }

    fn check_topology(&self) -> Result<()> {
        match self.validate_topology().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns `(input_len, output_len)` of a runnable network.
    fn dimensions(&self) -> Result<(usize, usize)> {
        self.check_topology()?;
        match (self.input_len(), self.output_len()) {
            (Some(input), Some(output)) => Ok((input, output)),
            _ => Err(Error::EmptyNetwork),
        }
    }

    /// Feeds `input` through the network without touching any layer's
    /// cached state.
    pub fn predict(&self, input: ArrayView1<f64>) -> Result<Array1<f64>> {
        let (input_len, _) = self.dimensions()?;
        check_len("network input", input.len(), input_len)?;
        let mut activation = input.to_owned();
        for layer in &self.layers {
            activation = layer.evaluate(activation.view())?;
        }
        Ok(activation)
    }

    /// Returns the weight magnitude of every layer, in order.
    pub fn weight_magnitudes(&self) -> Vec<f64> {
        self.layers
            .iter()
            .map(|layer| layer.weight_magnitude())
            .collect()
    }

    /// Mean cost over `set` without changing `last_cost`.
    fn mean_cost(&self, set: &TrainingSet) -> Result<f64> {
        let (input_len, output_len) = self.dimensions()?;
        set.check_dimensions(input_len, output_len)?;
        if set.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for sample in set {
            let output = self.predict(sample.input())?;
            total += self.cost.cost(output.view(), sample.target());
        }
        Ok(total / set.len() as f64)
    }

    /// Feeds the target back through the network, accumulating every
    /// layer's gradient into `gradients`. Returns the sample cost.
    fn feed_backwards(
        &mut self,
        input: ArrayView1<f64>,
        target: ArrayView1<f64>,
        gradients: &mut [Gradient],
    ) -> Result<f64> {
        self.state = TrainingState::Forward;
        let output = self.process(input)?;
        let cost = self.cost.cost(output.view(), target);

        self.state = TrainingState::Backward;
        let mut errors = self.cost.gradient(output.view(), target);
        for (layer, gradient) in self.layers.iter().zip(gradients.iter_mut()).rev() {
            let backprop = layer.backward(errors.view())?;
            *gradient += &backprop.gradient;
            errors = backprop.input_errors;
        }
        Ok(cost)
    }

    /// Averages the accumulated gradients over `samples` and applies them.
    fn update(&mut self, gradients: &mut [Gradient], samples: usize) -> Result<()> {
        let rate = self.learning_rate;
        for (layer, gradient) in self.layers.iter_mut().zip(gradients.iter_mut()) {
            gradient.scale(1.0 / samples as f64);
            layer.apply_gradient(rate, gradient)?;
        }
        self.state = TrainingState::Updated;
        Ok(())
    }

    /// Runs every hook due after batch `batch`.
    fn notify(&mut self, batch: usize) -> Result<()> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let hooks = mem::take(&mut self.hooks);
        let result = self.run_hooks(&hooks, batch);
        self.hooks = hooks;
        result
    }

    fn run_hooks(&self, hooks: &Hooks, batch: usize) -> Result<()> {
        for hook in hooks.due(batch) {
            let payload = match &hook.monitor {
                Monitor::WeightMagnitude => self.weight_magnitudes(),
                Monitor::Cost => vec![self.last_cost],
                Monitor::TestError(set) => vec![self.mean_cost(set)?],
            };
            (hook.callback)(batch, payload.as_slice());
        }
        Ok(())
    }

    /// Checks everything `learn` depends on before any weight changes.
    fn check_learn(&self, training_set: &TrainingSet, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter {
                what: "batch size",
                value: 0.0,
            });
        }
        if training_set.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        let (input_len, output_len) = self.dimensions()?;
        training_set.check_dimensions(input_len, output_len)?;
        for set in self.hooks.test_sets() {
            set.check_dimensions(input_len, output_len)?;
        }
        Ok(())
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::DimensionMismatch {
            what,
            got,
            expected,
        });
    }
    Ok(())
}

impl<L: Layer> Network for FeedForward<L> {
    fn process(&mut self, input: ArrayView1<f64>) -> Result<Array1<f64>> {
        let (input_len, _) = self.dimensions()?;
        check_len("network input", input.len(), input_len)?;
        let mut activation = input.to_owned();
        for layer in &mut self.layers {
            activation = layer.forward(activation.view())?;
        }
        Ok(activation)
    }

    fn learn(
        &mut self,
        training_set: &TrainingSet,
        batch_size: usize,
        epochs: usize,
    ) -> Result<TrainingReport> {
        self.check_learn(training_set, batch_size)?;
        self.state = TrainingState::Idle;

        let mut gradients: Vec<Gradient> =
            self.layers.iter().map(|layer| layer.new_gradient()).collect();
        let mut report = TrainingReport {
            epochs: 0,
            batches: 0,
            last_cost: self.last_cost,
            aborted: false,
        };

        for epoch in 0..epochs {
            for batch in training_set.samples().chunks(batch_size) {
                if self.abort.take() {
                    warn!(
                        "training aborted after {} batches of epoch {}",
                        report.batches,
                        epoch + 1
                    );
                    self.state = TrainingState::Aborted;
                    report.aborted = true;
                    report.last_cost = self.last_cost;
                    return Ok(report);
                }

                gradients.zero_out();
                let mut batch_cost = 0.0;
                for sample in batch {
                    batch_cost +=
                        self.feed_backwards(sample.input(), sample.target(), &mut gradients)?;
                }
                self.update(&mut gradients, batch.len())?;

                self.last_cost = batch_cost / batch.len() as f64;
                self.batches_seen += 1;
                report.batches += 1;
                debug!("batch {}: cost={}", self.batches_seen, self.last_cost);
                self.notify(self.batches_seen)?;
            }
            self.state = TrainingState::EpochComplete;
            report.epochs += 1;
            info!("epoch {} complete: cost={}", epoch + 1, self.last_cost);
        }

        self.state = TrainingState::Idle;
        report.last_cost = self.last_cost;
        Ok(report)
    }

    fn test(&mut self, test_set: &TrainingSet) -> Result<f64> {
        let cost = self.mean_cost(test_set)?;
        self.last_cost = cost;
        Ok(cost)
    }

    fn set_parameters(
        &mut self,
        learning_rate: Option<f64>,
        cost_function: Option<CostFunction>,
    ) -> Result<()> {
        if let Some(rate) = learning_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(Error::InvalidParameter {
                    what: "learning rate",
                    value: rate,
                });
            }
            self.learning_rate = rate;
        }
        if let Some(cost_function) = cost_function {
            self.cost_function = cost_function;
            self.cost = cost_function.strategy();
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn cost_function(&self) -> CostFunction {
        self.cost_function
    }

    fn last_cost(&self) -> f64 {
        self.last_cost
    }

    fn state(&self) -> TrainingState {
        self.state
    }

    fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }
}
