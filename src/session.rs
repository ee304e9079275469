//! The state a designer front end keeps between user actions: the network
//! being edited, the data sets loaded so far and which of them are
//! selected.
//!
//! A `Session` is an ordinary value, so independent sessions (and tests)
//! can run side by side.

use std::{collections::HashMap, path::Path, sync::Arc};

use log::{info, warn};

use crate::cost::CostFunction;
use crate::data::TrainingSet;
use crate::feed_forward::FeedForward;
use crate::layers::Dense;
use crate::monitor::{Callback, HookId, Monitor};
use crate::network::{Network, TrainingReport};
use crate::{Error, Result};

#[derive(Debug)]
pub struct Session {
    network: Option<FeedForward>,
    training_sets: HashMap<String, Arc<TrainingSet>>,
    test_sets: HashMap<String, Arc<TrainingSet>>,
    selected_training: Option<Arc<TrainingSet>>,
    selected_test: Option<Arc<TrainingSet>>,
    /// Sampling frequency of test monitors, in batches.
    pub test_sample_every: usize,
    /// Sampling frequency of weight monitors, in batches.
    pub sample_every: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            network: None,
            training_sets: HashMap::new(),
            test_sets: HashMap::new(),
            selected_training: None,
            selected_test: None,
            test_sample_every: 1,
            sample_every: 1,
        }
    }

    /// Replaces the current network with an empty one.
    pub fn new_network(&mut self) -> &mut FeedForward {
        self.network.insert(FeedForward::new())
    }

    /// Makes `network` the current network.
    pub fn set_network(&mut self, network: FeedForward) {
        self.network = Some(network);
    }

    pub fn network(&self) -> Result<&FeedForward> {
        self.network.as_ref().ok_or(Error::UndefinedNetwork)
    }

    pub fn network_mut(&mut self) -> Result<&mut FeedForward> {
        self.network.as_mut().ok_or(Error::UndefinedNetwork)
    }

    pub fn set_network_parameters(
        &mut self,
        learning_rate: Option<f64>,
        cost_function: Option<CostFunction>,
    ) -> Result<()> {
        self.network_mut()?
            .set_parameters(learning_rate, cost_function)
    }

    /// Inserts `layer` into the current network; `None` appends.
    pub fn insert_layer(&mut self, layer: Dense, position: Option<usize>) -> Result<()> {
        self.network_mut()?.add(layer, position)
    }

    /// Loads a training set from `path` and caches it as `name`.
    ///
    /// Returns `false`, caching nothing, if `name` is already taken or the
    /// file cannot be read or parsed.
    pub fn load_training_set<P: AsRef<Path>>(&mut self, name: &str, path: P) -> bool {
        load_into(&mut self.training_sets, name, path.as_ref())
    }

    /// Loads a test set from `path` and caches it as `name`.
    pub fn load_test_set<P: AsRef<Path>>(&mut self, name: &str, path: P) -> bool {
        load_into(&mut self.test_sets, name, path.as_ref())
    }

    /// The test set selected by [`Session::select_test_set`], if any.
    pub fn selected_test_set(&self) -> Option<&Arc<TrainingSet>> {
        self.selected_test.as_ref()
    }

    pub fn selected_training_set(&self) -> Option<&Arc<TrainingSet>> {
        self.selected_training.as_ref()
    }

    pub fn select_training_set(&mut self, name: &str) -> Result<()> {
        let set = self
            .training_sets
            .get(name)
            .ok_or_else(|| Error::UnknownDataSet(name.to_string()))?;
        self.selected_training = Some(set.clone());
        Ok(())
    }

    pub fn select_test_set(&mut self, name: &str) -> Result<()> {
        let set = self
            .test_sets
            .get(name)
            .ok_or_else(|| Error::UnknownDataSet(name.to_string()))?;
        self.selected_test = Some(set.clone());
        Ok(())
    }

    /// Reports the weight magnitude of every layer every `sample_every`
    /// batches.
    pub fn add_weight_monitor(&mut self, callback: Callback) -> Result<HookId> {
        let every = self.sample_every;
        Ok(self
            .network_mut()?
            .hooks_mut()
            .register(Monitor::WeightMagnitude, every, callback))
    }

    /// Reports the cost of every batch.
    pub fn add_cost_monitor(&mut self, callback: Callback) -> Result<HookId> {
        Ok(self
            .network_mut()?
            .hooks_mut()
            .register(Monitor::Cost, 1, callback))
    }

    /// Reports the cost over the currently selected test set every
    /// `test_sample_every` batches.
    pub fn add_test_monitor(&mut self, callback: Callback) -> Result<HookId> {
        let every = self.test_sample_every;
        let set = self
            .selected_test
            .clone()
            .ok_or(Error::NoDataSetSelected("test"))?;
        Ok(self
            .network_mut()?
            .hooks_mut()
            .register(Monitor::TestError(set), every, callback))
    }

    pub fn remove_hook(&mut self, id: HookId) -> Result<bool> {
        Ok(self.network_mut()?.hooks_mut().remove(id))
    }

    pub fn remove_hooks(&mut self) -> Result<()> {
        self.network_mut()?.hooks_mut().clear();
        Ok(())
    }

    /// Trains the current network on the selected training set, testing it
    /// against that same set after every epoch.
    pub fn train(&mut self, epochs: usize, batch_size: usize) -> Result<TrainingReport> {
        let set = self
            .selected_training
            .clone()
            .ok_or(Error::NoDataSetSelected("training"))?;
        let network = self.network.as_mut().ok_or(Error::UndefinedNetwork)?;

        let mut total = TrainingReport {
            epochs: 0,
            batches: 0,
            last_cost: network.last_cost(),
            aborted: false,
        };
        for _ in 0..epochs {
            let report = network.learn(&set, batch_size, 1)?;
            total.epochs += report.epochs;
            total.batches += report.batches;
            total.last_cost = report.last_cost;
            if report.aborted {
                total.aborted = true;
                break;
            }
            total.last_cost = network.test(&set)?;
        }
        info!(
            "trained {} epochs ({} batches), cost={}",
            total.epochs, total.batches, total.last_cost
        );
        Ok(total)
    }
}

fn load_into(cache: &mut HashMap<String, Arc<TrainingSet>>, name: &str, path: &Path) -> bool {
    if cache.contains_key(name) {
        warn!("a data set named {name:?} is already loaded, not loading {}", path.display());
        return false;
    }
    match TrainingSet::load(path) {
        Ok(set) => {
            info!(
                "loaded {} samples from {} as {:?}",
                set.len(),
                path.display(),
                name
            );
            cache.insert(name.to_string(), Arc::new(set));
            true
        }
        Err(err) => {
            warn!("failed to load {}: {}", path.display(), err);
            false
        }
    }
}
