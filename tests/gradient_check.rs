// Compares the analytic gradients of a two layer network against central
// finite differences of the cost, for every activation and cost function.

use ndarray::{array, Array1, Array2};

use netdesign::cost::Cost;
use netdesign::layers::Gradient;
use netdesign::prelude::*;

const EPSILON: f64 = 1e-5;
const TOLERANCE: f64 = 1e-4;

const ACTIVATORS: [Activator; 5] = [
    Activator::Identity,
    Activator::ReLU,
    Activator::LeakyReLU(0.05),
    Activator::Sigmoid,
    Activator::TanH,
];

fn input() -> Array1<f64> {
    array![0.5, -0.3, 0.8]
}

fn target() -> Array1<f64> {
    array![0.8, 0.2]
}

// Pre-activations of both layers stay well away from zero, so ReLU's kink
// never falls inside a perturbation.
fn layers(
    hidden: Activator,
    output: Activator,
    regularization: Regularization,
) -> (Dense, Dense) {
    let mut first = Dense::new(hidden, 3, 4)
        .unwrap()
        .regularized(regularization, 0.05);
    first
        .set_weights(
            array![
                [0.2, -0.4, 0.3],
                [-0.5, 0.1, 0.6],
                [0.7, 0.2, -0.1],
                [-0.3, -0.6, 0.2]
            ],
            array![0.1, -0.1, 0.05, -0.8],
        )
        .unwrap();
    let mut second = Dense::new(output, 4, 2)
        .unwrap()
        .regularized(regularization, 0.05);
    second
        .set_weights(
            array![[0.3, -0.2, 0.5, 0.4], [-0.6, 0.4, 0.1, -0.3]],
            array![0.05, -0.1],
        )
        .unwrap();
    (first, second)
}

fn total_cost(first: &Dense, second: &Dense, cost: &dyn Cost) -> f64 {
    let hidden = first.evaluate(input().view()).unwrap();
    let output = second.evaluate(hidden.view()).unwrap();
    let penalty = first.regularization().penalty(first.weights(), first.lambda())
        + second.regularization().penalty(second.weights(), second.lambda());
    cost.cost(output.view(), target().view()) + penalty
}

fn analytic(first: &mut Dense, second: &mut Dense, cost: &dyn Cost) -> (Gradient, Gradient) {
    let hidden = first.forward(input().view()).unwrap();
    let output = second.forward(hidden.view()).unwrap();
    let errors = cost.gradient(output.view(), target().view());
    let back = second.backward(errors.view()).unwrap();
    let front = first.backward(back.input_errors.view()).unwrap();
    (front.gradient, back.gradient)
}

fn perturbed(layer: &Dense, row: usize, col: usize, delta: f64) -> Dense {
    let mut weights: Array2<f64> = layer.weights().to_owned();
    weights[[row, col]] += delta;
    let mut copy = Dense::new(layer.activator(), layer.input_len(), layer.output_len())
        .unwrap()
        .regularized(layer.regularization(), layer.lambda());
    copy.set_weights(weights, layer.bias().to_owned()).unwrap();
    copy
}

fn perturbed_bias(layer: &Dense, row: usize, delta: f64) -> Dense {
    let mut bias = layer.bias().to_owned();
    bias[row] += delta;
    let mut copy = Dense::new(layer.activator(), layer.input_len(), layer.output_len())
        .unwrap()
        .regularized(layer.regularization(), layer.lambda());
    copy.set_weights(layer.weights().to_owned(), bias).unwrap();
    copy
}

fn check(hidden: Activator, output: Activator, cost: CostFunction, regularization: Regularization) {
    let cost = cost.strategy();
    let (mut first, mut second) = layers(hidden, output, regularization);
    let (first_grad, second_grad) = analytic(&mut first, &mut second, cost.as_ref());

    let compare = |numeric: f64, analytic: f64, what: &str| {
        assert!(
            (numeric - analytic).abs() < TOLERANCE,
            "{hidden:?}/{output:?}/{cost:?}/{regularization:?} {what}: numeric {numeric} vs analytic {analytic}"
        );
    };

    for ((row, col), &grad) in first_grad.weights.indexed_iter() {
        let plus = total_cost(&perturbed(&first, row, col, EPSILON), &second, cost.as_ref());
        let minus = total_cost(&perturbed(&first, row, col, -EPSILON), &second, cost.as_ref());
        compare((plus - minus) / (2.0 * EPSILON), grad, "hidden weight");
    }
    for ((row, col), &grad) in second_grad.weights.indexed_iter() {
        let plus = total_cost(&first, &perturbed(&second, row, col, EPSILON), cost.as_ref());
        let minus = total_cost(&first, &perturbed(&second, row, col, -EPSILON), cost.as_ref());
        compare((plus - minus) / (2.0 * EPSILON), grad, "output weight");
    }
    for (row, &grad) in first_grad.bias.indexed_iter() {
        let plus = total_cost(&perturbed_bias(&first, row, EPSILON), &second, cost.as_ref());
        let minus = total_cost(&perturbed_bias(&first, row, -EPSILON), &second, cost.as_ref());
        compare((plus - minus) / (2.0 * EPSILON), grad, "hidden bias");
    }
    for (row, &grad) in second_grad.bias.indexed_iter() {
        let plus = total_cost(&first, &perturbed_bias(&second, row, EPSILON), cost.as_ref());
        let minus = total_cost(&first, &perturbed_bias(&second, row, -EPSILON), cost.as_ref());
        compare((plus - minus) / (2.0 * EPSILON), grad, "output bias");
    }
}

#[test]
fn mean_square_with_every_activation() {
    for activator in ACTIVATORS {
        check(activator, activator, CostFunction::MeanSquare, Regularization::None);
    }
}

#[test]
fn cross_entropy_with_every_hidden_activation() {
    // Cross entropy needs predictions in (0, 1).
    for activator in ACTIVATORS {
        check(activator, Activator::Sigmoid, CostFunction::CrossEntropy, Regularization::None);
    }
}

#[test]
fn regularized_gradients_include_the_penalty() {
    for regularization in [Regularization::L1, Regularization::L2] {
        check(Activator::TanH, Activator::Sigmoid, CostFunction::MeanSquare, regularization);
        check(Activator::ReLU, Activator::Sigmoid, CostFunction::CrossEntropy, regularization);
    }
}
