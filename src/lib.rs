//! Layered feed-forward networks with pluggable activation functions, cost
//! functions and regularization, trained by mini-batch gradient descent.

pub mod activator;
pub mod config;
pub mod cost;
pub mod data;
pub mod error;
pub mod feed_forward;
pub mod layers;
pub mod monitor;
pub mod network;
pub mod regularization;
pub mod session;
pub mod trainer;

mod matrix;
mod utils;

pub use error::{Error, Result};

/// The types needed to build and train a network.
pub mod prelude {
    pub use crate::activator::Activator;
    pub use crate::cost::CostFunction;
    pub use crate::data::{TrainingSample, TrainingSet};
    pub use crate::feed_forward::FeedForward;
    pub use crate::layers::{Dense, Layer};
    pub use crate::monitor::{Callback, Monitor};
    pub use crate::network::{Network, TrainingReport};
    pub use crate::regularization::Regularization;
    pub use crate::trainer::{Logging, StopCondition, Trainer};
}
