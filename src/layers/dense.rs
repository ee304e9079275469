use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::activator::Activator;
use crate::layers::{self, Backprop, Gradient, LayerId};
use crate::matrix;
use crate::regularization::{Regularization, DEFAULT_LAMBDA};
use crate::{Error, Result};

/// Values remembered by `forward` for the next `backward`.
#[derive(Clone, Debug)]
struct Cache {
    inputs: Array1<f64>,
    z: Array1<f64>,
}

/// A wrapper for a fully connected layer of a neural network
///
/// This performs efficient network updates by storing the weights for every
/// neuron as a single Matrix.
#[derive(Debug)]
pub struct Dense {
    id: LayerId,
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    regularization: Regularization,
    lambda: f64,
    /// The network weights, with each neuron's weights stored as a row.
    weights: Array2<f64>,
    bias: Array1<f64>,
    cache: Option<Cache>,
}

impl Dense {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output.
    ///  * `inputs` - the number of inputs to this layer.
    ///  * `outputs` - the number of outputs from this layer.
    pub fn new(activator: Activator, inputs: usize, outputs: usize) -> Result<Self> {
        Self::with_rng(activator, inputs, outputs, &mut rand::thread_rng())
    }

    /// Like `new`, drawing the initial weights from `rng`.
    pub fn with_rng<R>(
        activator: Activator,
        inputs: usize,
        outputs: usize,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        check_dimensions(inputs, outputs)?;
        Ok(Dense {
            id: LayerId::next(),
            activator,
            regularization: Regularization::None,
            lambda: DEFAULT_LAMBDA,
            weights: matrix::random(outputs, inputs, rng),
            bias: Array1::zeros(outputs),
            cache: None,
        })
    }

    /// Sets the weight penalty and its strength.
    pub fn regularized(mut self, regularization: Regularization, lambda: f64) -> Self {
        self.regularization = regularization;
        self.lambda = lambda;
        self
    }

    /// Updates whichever parameters are provided.
    ///
    /// Changing either dimension discards the trained weights and draws new
    /// ones.
    pub fn set_parameters(
        &mut self,
        inputs: Option<usize>,
        outputs: Option<usize>,
        activator: Option<Activator>,
        regularization: Option<Regularization>,
    ) -> Result<()> {
        let new_inputs = inputs.unwrap_or(self.weights.ncols());
        let new_outputs = outputs.unwrap_or(self.weights.nrows());
        check_dimensions(new_inputs, new_outputs)?;
        if (new_outputs, new_inputs) != self.weights.dim() {
            self.weights = matrix::random(new_outputs, new_inputs, &mut rand::thread_rng());
            self.bias = Array1::zeros(new_outputs);
            self.cache = None;
        }
        if let Some(activator) = activator {
            self.activator = activator;
        }
        if let Some(regularization) = regularization {
            self.regularization = regularization;
        }
        Ok(())
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn regularization(&self) -> Regularization {
        self.regularization
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn weights(&self) -> ArrayView2<f64> {
        self.weights.view()
    }

    pub fn bias(&self) -> ArrayView1<f64> {
        self.bias.view()
    }

    /// Replaces the parameters, which must keep the layer's shape.
    pub fn set_weights(&mut self, weights: Array2<f64>, bias: Array1<f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(Error::DimensionMismatch {
                what: "replacement weights",
                got: weights.len(),
                expected: self.weights.len(),
            });
        }
        if bias.len() != self.bias.len() {
            return Err(Error::DimensionMismatch {
                what: "replacement bias",
                got: bias.len(),
                expected: self.bias.len(),
            });
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    fn pre_activation(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        if inputs.len() != self.weights.ncols() {
            return Err(Error::DimensionMismatch {
                what: "layer input",
                got: inputs.len(),
                expected: self.weights.ncols(),
            });
        }
        Ok(self.weights.dot(&inputs) + &self.bias)
    }
}

fn check_dimensions(inputs: usize, outputs: usize) -> Result<()> {
    if inputs == 0 {
        return Err(Error::InvalidDimension {
            what: "layer input dimension",
        });
    }
    if outputs == 0 {
        return Err(Error::InvalidDimension {
            what: "layer output dimension",
        });
    }
    Ok(())
}

impl layers::Layer for Dense {
    fn id(&self) -> LayerId {
        self.id
    }

    fn input_len(&self) -> usize {
        self.weights.ncols()
    }

    fn output_len(&self) -> usize {
        self.weights.nrows()
    }

    fn evaluate(&self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        let z = self.pre_activation(inputs)?;
        Ok(self.activator.apply(z.view()))
    }

    fn forward(&mut self, inputs: ArrayView1<f64>) -> Result<Array1<f64>> {
        let z = self.pre_activation(inputs)?;
        let a = self.activator.apply(z.view());
        self.cache = Some(Cache {
            inputs: inputs.to_owned(),
            z,
        });
        Ok(a)
    }

    /// Feeds the provided `output_errors` backwards through the layer.
    fn backward(&self, output_errors: ArrayView1<f64>) -> Result<Backprop> {
        let cache = self.cache.as_ref().ok_or(Error::MissingForwardPass)?;
        if output_errors.len() != self.output_len() {
            return Err(Error::DimensionMismatch {
                what: "layer output errors",
                got: output_errors.len(),
                expected: self.output_len(),
            });
        }
        let delta = &output_errors * &self.activator.derivative(cache.z.view());
        let mut weights = matrix::outer(delta.view(), cache.inputs.view());
        if let Some(penalty) = self.regularization.gradient(self.weights.view(), self.lambda) {
            weights += &penalty;
        }
        Ok(Backprop {
            input_errors: self.weights.t().dot(&delta),
            gradient: Gradient {
                weights,
                bias: delta,
            },
        })
    }

    fn apply_gradient(&mut self, rate: f64, gradient: &Gradient) -> Result<()> {
        if gradient.weights.dim() != self.weights.dim() || gradient.bias.len() != self.bias.len() {
            return Err(Error::DimensionMismatch {
                what: "layer gradient",
                got: gradient.weights.len(),
                expected: self.weights.len(),
            });
        }
        self.weights.scaled_add(-rate, &gradient.weights);
        self.bias.scaled_add(-rate, &gradient.bias);
        Ok(())
    }

    fn weight_magnitude(&self) -> f64 {
        matrix::frobenius_norm(self.weights.view())
    }
}
