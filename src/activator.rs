//! Activation function types.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Activator {
    /// Passes the pre-activation through unchanged.
    Identity,
    /// Rectified Linear Unit
    ReLU,
    /// Leaky Rectified Linear Unit
    ///
    /// Takes an `alpha` value to use for negative inputs.
    LeakyReLU(f64),
    /// Sigmoid function
    #[default]
    Sigmoid,
    /// Hyperbolic tan function
    TanH,
}

impl Activator {
    /// Evaluates `f(z)` for the selected activation function.
    pub fn f(&self, z: f64) -> f64 {
        match *self {
            Activator::Identity => z,
            Activator::ReLU => {
                if z > 0.0 {
                    z
                } else {
                    0.0
                }
            }
            Activator::LeakyReLU(alpha) => {
                if z > 0.0 {
                    z
                } else {
                    alpha * z
                }
            }
            Activator::Sigmoid => sigmoid(z),
            Activator::TanH => z.tanh(),
        }
    }

    /// Evaluates the derivative `f'(z)` at the pre-activation `z`.
    ///
    /// ReLU-style functions use a subgradient of 0 (or `alpha`) at `z = 0`.
    pub fn fprime(&self, z: f64) -> f64 {
        match *self {
            Activator::Identity => 1.0,
            Activator::ReLU => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activator::LeakyReLU(alpha) => {
                if z > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
            Activator::Sigmoid => {
                let y = sigmoid(z);
                y * (1.0 - y)
            }
            Activator::TanH => {
                let y = z.tanh();
                1.0 - y * y
            }
        }
    }

    /// Applies `f` elementwise.
    pub fn apply(&self, z: ArrayView1<f64>) -> Array1<f64> {
        z.mapv(|z| self.f(z))
    }

    /// Applies `f'` elementwise.
    pub fn derivative(&self, z: ArrayView1<f64>) -> Array1<f64> {
        z.mapv(|z| self.fprime(z))
    }
}

/// Logistic function that never evaluates `exp` of a large positive number.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
