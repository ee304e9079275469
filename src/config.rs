//! Serializable description of a network's topology and parameters.
//!
//! ```json
//! {
//!   "learning_rate": 0.5,
//!   "cost": "CrossEntropy",
//!   "layers": [
//!     { "inputs": 2, "outputs": 4, "activator": "TanH" },
//!     { "inputs": 4, "outputs": 1, "activator": "Sigmoid", "regularization": "L2", "lambda": 0.01 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::activator::Activator;
use crate::cost::CostFunction;
use crate::feed_forward::FeedForward;
use crate::layers::Dense;
use crate::network::Network;
use crate::regularization::{Regularization, DEFAULT_LAMBDA};
use crate::{Error, Result};

fn default_learning_rate() -> f64 {
    0.1
}

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub inputs: usize,
    pub outputs: usize,
    #[serde(default)]
    pub activator: Activator,
    #[serde(default)]
    pub regularization: Regularization,
    #[serde(default = "default_lambda")]
    pub lambda: f64,
}

impl LayerConfig {
    pub fn build(&self) -> Result<Dense> {
        Ok(Dense::new(self.activator, self.inputs, self.outputs)?
            .regularized(self.regularization, self.lambda))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub cost: CostFunction,
    pub layers: Vec<LayerConfig>,
}

impl NetworkConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    /// Builds an untrained network, refusing topologies that could not run.
    pub fn build(&self) -> Result<FeedForward> {
        let mut network = FeedForward::new();
        for layer in &self.layers {
            network.add(layer.build()?, None)?;
        }
        network.set_parameters(Some(self.learning_rate), Some(self.cost))?;
        if let Some(err) = network.validate_topology().into_iter().next() {
            return Err(err);
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Layer;

    const JSON: &str = r#"{
        "learning_rate": 0.5,
        "cost": "CrossEntropy",
        "layers": [
            { "inputs": 2, "outputs": 4, "activator": "TanH" },
            { "inputs": 4, "outputs": 1, "regularization": "L2", "lambda": 0.01 }
        ]
    }"#;

    #[test]
    fn parses_and_builds() {
        let config = NetworkConfig::from_json(JSON).unwrap();
        assert_eq!(config.layers[1].activator, Activator::Sigmoid);
        assert_eq!(config.layers[0].lambda, DEFAULT_LAMBDA);

        let network = config.build().unwrap();
        assert_eq!(network.len(), 2);
        assert_eq!(network.learning_rate(), 0.5);
        assert_eq!(network.cost_function(), CostFunction::CrossEntropy);
        let output = network.layer(1).unwrap();
        assert_eq!(output.regularization(), Regularization::L2);
        assert_eq!(output.lambda(), 0.01);
        assert_eq!(output.input_len(), 4);

        let again = NetworkConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn rejects_bad_configs() {
        assert!(matches!(
            NetworkConfig::from_json("{ \"layers\": 3 }"),
            Err(Error::InvalidConfig(_))
        ));
        let mismatched = NetworkConfig::from_json(
            r#"{ "layers": [ { "inputs": 2, "outputs": 3 }, { "inputs": 2, "outputs": 1 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            mismatched.build(),
            Err(Error::DimensionMismatch { .. })
        ));
        let empty = NetworkConfig::from_json(r#"{ "layers": [] }"#).unwrap();
        assert!(matches!(empty.build(), Err(Error::EmptyNetwork)));
        let zero = NetworkConfig::from_json(r#"{ "layers": [ { "inputs": 0, "outputs": 1 } ] }"#)
            .unwrap();
        assert!(zero.build().is_err());
    }
}
