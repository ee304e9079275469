//! Layers of a feed-forward network.

use std::{
    fmt,
    ops::AddAssign,
    sync::atomic::{AtomicU64, Ordering},
};

use ndarray::{Array1, Array2, ArrayView1};

use crate::utils::ZeroOut;
use crate::Result;

pub mod dense;

pub use self::dense::Dense;

/// Process-unique identity of a layer, used to remove it from a network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameter gradient of one layer, shaped like its weights and bias.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl Gradient {
    pub fn zeros(outputs: usize, inputs: usize) -> Self {
        Gradient {
            weights: Array2::zeros((outputs, inputs)),
            bias: Array1::zeros(outputs),
        }
    }

    /// Multiplies every component by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.weights *= factor;
        self.bias *= factor;
    }
}

impl<'a> AddAssign<&'a Gradient> for Gradient {
    fn add_assign(&mut self, other: &Gradient) {
        self.weights += &other.weights;
        self.bias += &other.bias;
    }
}

impl ZeroOut for Gradient {
    fn zero_out(&mut self) {
        self.weights.zero_out();
        self.bias.zero_out();
    }
}

/// The result of feeding errors backwards through a layer.
#[derive(Clone, Debug)]
pub struct Backprop {
    /// `d cost / d input`, to be fed to the previous layer.
    pub input_errors: Array1<f64>,
    /// `d cost / d parameters` for this layer, including any regularization.
    pub gradient: Gradient,
}

/// A single stage of a feed-forward network.
pub trait Layer: fmt::Debug + Send {
    fn id(&self) -> LayerId;

    fn input_len(&self) -> usize;

    fn output_len(&self) -> usize;

    /// Returns a zeroed gradient shaped for this layer.
    fn new_gradient(&self) -> Gradient {
        Gradient::zeros(self.output_len(), self.input_len())
    }

    /// Computes the layer output without touching any cached state.
    fn evaluate(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>>;

    /// Computes the layer output, remembering what `backward` needs.
    fn forward(&mut self, inputs: ArrayView1<f64>) -> Result<Array1<f64>>;

    /// Feeds `output_errors` (`d cost / d output`) backwards through the
    /// state cached by the last `forward`.
    fn backward(&self, output_errors: ArrayView1<f64>) -> Result<Backprop>;

    /// Descends along `gradient`, scaled by `rate`.
    fn apply_gradient(&mut self, rate: f64, gradient: &Gradient) -> Result<()>;

    /// Frobenius norm of the weights.
    fn weight_magnitude(&self) -> f64;
}
