//! The behaviour shared by every network type.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use ndarray::{Array1, ArrayView1};

use crate::cost::CostFunction;
use crate::data::TrainingSet;
use crate::monitor::Hooks;
use crate::Result;

/// Where a network is in a training run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TrainingState {
    #[default]
    Idle,
    Forward,
    Backward,
    Updated,
    EpochComplete,
    Aborted,
}

/// Summary of one `learn` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrainingReport {
    /// Epochs that ran to completion.
    pub epochs: usize,
    /// Batches whose update was applied.
    pub batches: usize,
    pub last_cost: f64,
    pub aborted: bool,
}

/// Cooperative cancellation flag for a training run.
///
/// Clones share one flag, so a handle can be moved into a hook or another
/// thread. The loop polls it before every batch.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Withdraws a request that has not been honoured yet.
    pub fn cancel(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Consumes a pending request.
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// A trainable network.
pub trait Network {
    /// Feeds `input` through every layer, returning the last layer's output.
    fn process(&mut self, input: ArrayView1<f64>) -> Result<Array1<f64>>;

    /// Trains for `epochs` passes over `training_set`, applying one update
    /// per batch of `batch_size` samples.
    fn learn(
        &mut self,
        training_set: &TrainingSet,
        batch_size: usize,
        epochs: usize,
    ) -> Result<TrainingReport>;

    /// Returns the mean cost over `test_set` without changing any weights.
    fn test(&mut self, test_set: &TrainingSet) -> Result<f64>;

    /// Updates whichever parameters are provided.
    fn set_parameters(
        &mut self,
        learning_rate: Option<f64>,
        cost_function: Option<CostFunction>,
    ) -> Result<()>;

    fn learning_rate(&self) -> f64;

    fn cost_function(&self) -> CostFunction;

    /// The cost of the most recent batch or test pass.
    fn last_cost(&self) -> f64;

    fn state(&self) -> TrainingState;

    fn abort_handle(&self) -> AbortHandle;

    fn hooks_mut(&mut self) -> &mut Hooks;
}
