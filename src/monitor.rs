//! Observers invoked by the training loop after every batch.
//!
//! A registration pairs a `Monitor`, which decides what telemetry is
//! produced, with a `Callback` receiving the batch index and that payload.
//! Callbacks run synchronously: the next batch does not start until they
//! return.

use std::{fmt, mem, sync::Arc};

use crate::data::TrainingSet;

/// Receives `(batch_index, payload)`.
pub type Callback = Arc<dyn Fn(usize, &[f64]) + Send + Sync>;

/// The telemetry a hook reports.
#[derive(Clone, Debug)]
pub enum Monitor {
    /// The weight magnitude of every layer, in network order.
    WeightMagnitude,
    /// The mean cost of the batch that just completed.
    Cost,
    /// The mean cost over a held-out set.
    TestError(Arc<TrainingSet>),
}

impl Monitor {
    fn same_kind(&self, other: &Monitor) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// Identifies a registration so it can be removed on its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HookId(u64);

pub(crate) struct Hook {
    id: HookId,
    pub(crate) monitor: Monitor,
    every: usize,
    pub(crate) callback: Callback,
}

impl Hook {
    fn is_due(&self, batch: usize) -> bool {
        batch % self.every == 0
    }
}

/// The hooks registered on one network.
#[derive(Default)]
pub struct Hooks {
    next_id: u64,
    hooks: Vec<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to receive `monitor`'s payload every `every`
    /// batches (`0` means every batch).
    ///
    /// Registering the same callback for the same kind of monitor twice
    /// returns the first registration's id and leaves the hooks unchanged.
    pub fn register(&mut self, monitor: Monitor, every: usize, callback: Callback) -> HookId {
        if let Some(existing) = self
            .hooks
            .iter()
            .find(|hook| hook.monitor.same_kind(&monitor) && Arc::ptr_eq(&hook.callback, &callback))
        {
            return existing.id;
        }
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push(Hook {
            id,
            monitor,
            every: every.max(1),
            callback,
        });
        id
    }

    /// Removes a single registration, returning whether it existed.
    pub fn remove(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|hook| hook.id != id);
        self.hooks.len() != before
    }

    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// The held-out sets referenced by test monitors.
    pub(crate) fn test_sets(&self) -> impl Iterator<Item = &TrainingSet> {
        self.hooks.iter().filter_map(|hook| match &hook.monitor {
            Monitor::TestError(set) => Some(set.as_ref()),
            _ => None,
        })
    }

    /// Hooks that should fire after batch `batch`, in registration order.
    pub(crate) fn due(&self, batch: usize) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(move |hook| hook.is_due(batch))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| (hook.id, &hook.monitor, hook.every)))
            .finish()
    }
}
