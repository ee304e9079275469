//! Weight penalties added to a layer's weight gradient.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Strength used when a layer is created without an explicit `lambda`.
pub const DEFAULT_LAMBDA: f64 = 1e-3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Regularization {
    #[default]
    None,
    /// Penalises `lambda * sum(|w|)`.
    L1,
    /// Penalises `lambda / 2 * sum(w^2)`.
    L2,
}

impl Regularization {
    /// The penalty term for `weights`. Its derivative is `gradient`.
    pub fn penalty(&self, weights: ArrayView2<f64>, lambda: f64) -> f64 {
        match self {
            Regularization::None => 0.0,
            Regularization::L1 => lambda * weights.iter().map(|w| w.abs()).sum::<f64>(),
            Regularization::L2 => 0.5 * lambda * weights.iter().map(|w| w * w).sum::<f64>(),
        }
    }

    /// Returns the penalty's contribution to the weight gradient, or `None`
    /// when nothing is added.
    pub fn gradient(&self, weights: ArrayView2<f64>, lambda: f64) -> Option<Array2<f64>> {
        match self {
            Regularization::None => None,
            Regularization::L1 => Some(weights.mapv(|w| lambda * sign(w))),
            Regularization::L2 => Some(&weights * lambda),
        }
    }
}

/// `signum` with `sign(0) = 0`.
fn sign(w: f64) -> f64 {
    if w > 0.0 {
        1.0
    } else if w < 0.0 {
        -1.0
    } else {
        0.0
    }
}
