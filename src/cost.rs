//! Cost functions measuring how far a prediction is from its target.

use std::fmt;

use itertools::izip;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Predictions are kept this far away from 0 and 1 by `CrossEntropy`.
pub const PROBABILITY_CLAMP: f64 = 1e-7;

/// A loss over a single prediction.
pub trait Cost: fmt::Debug + Send + Sync {
    /// Returns the aggregate cost, averaged over the output dimension.
    fn cost(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> f64;

    /// Returns `d cost / d predicted` for every output.
    fn gradient(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> Array1<f64>;
}

/// Mean squared error.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanSquare;

impl Cost for MeanSquare {
    fn cost(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
        (&predicted - &target)
            .mapv(|x| x * x)
            .mean()
            .unwrap_or_default()
    }

    fn gradient(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> Array1<f64> {
        (&predicted - &target) * (2.0 / predicted.len() as f64)
    }
}

/// Binary cross entropy, averaged over the outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

fn clamp(p: f64) -> f64 {
    p.clamp(PROBABILITY_CLAMP, 1.0 - PROBABILITY_CLAMP)
}

impl Cost for CrossEntropy {
    fn cost(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
        let n = predicted.len();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = izip!(predicted.iter(), target.iter())
            .map(|(&p, &t)| {
                let p = clamp(p);
                t * p.ln() + (1.0 - t) * (1.0 - p).ln()
            })
            .sum();
        -total / n as f64
    }

    fn gradient(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> Array1<f64> {
        let n = predicted.len() as f64;
        izip!(predicted.iter(), target.iter())
            .map(|(&p, &t)| {
                let p = clamp(p);
                (p - t) / (p * (1.0 - p) * n)
            })
            .collect()
    }
}

/// Selects which `Cost` a network trains against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CostFunction {
    #[default]
    MeanSquare,
    CrossEntropy,
}

impl CostFunction {
    /// Resolves the selector into its strategy.
    pub fn strategy(self) -> Box<dyn Cost> {
        match self {
            CostFunction::MeanSquare => Box::new(MeanSquare),
            CostFunction::CrossEntropy => Box::new(CrossEntropy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn mean_square() {
        let p = array![1.0, 2.0];
        let t = array![0.0, 4.0];
        assert_close(MeanSquare.cost(p.view(), t.view()), 2.5);
        assert_eq!(MeanSquare.gradient(p.view(), t.view()), array![1.0, -2.0]);
    }

    #[test]
    fn cross_entropy() {
        let p = array![0.5];
        let t = array![1.0];
        assert_close(CrossEntropy.cost(p.view(), t.view()), 2f64.ln());
        assert_close(CrossEntropy.gradient(p.view(), t.view())[0], -2.0);
    }

    #[test]
    fn cross_entropy_clamps_extremes() {
        let p = array![0.0, 1.0];
        let t = array![1.0, 0.0];
        let cost = CrossEntropy.cost(p.view(), t.view());
        assert!(cost.is_finite());
        assert!(cost > 10.0);
        assert!(CrossEntropy
            .gradient(p.view(), t.view())
            .iter()
            .all(|g| g.is_finite()));
    }

    #[test]
    fn gradients_match_finite_differences() {
        let eps = 1e-6;
        let t = array![0.9, 0.1, 0.4];
        for cost in [CostFunction::MeanSquare, CostFunction::CrossEntropy] {
            let cost = cost.strategy();
            let p = array![0.3, 0.6, 0.45];
            let analytic = cost.gradient(p.view(), t.view());
            for i in 0..p.len() {
                let mut plus = p.clone();
                let mut minus = p.clone();
                plus[i] += eps;
                minus[i] -= eps;
                let numeric = (cost.cost(plus.view(), t.view())
                    - cost.cost(minus.view(), t.view()))
                    / (2.0 * eps);
                assert!((numeric - analytic[i]).abs() < 1e-6, "{cost:?} output {i}");
            }
        }
    }
}
