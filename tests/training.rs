use std::{
    fs,
    sync::{Arc, Mutex},
};

use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};

use netdesign::monitor::Monitor;
use netdesign::prelude::*;

fn xor() -> TrainingSet {
    TrainingSet::from_pairs([
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![0.0]),
    ])
    .unwrap()
}

fn xor_network(seed: u64, cost: CostFunction) -> FeedForward {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut network = FeedForward::new();
    network
        .add(Dense::with_rng(Activator::TanH, 2, 4, &mut rng).unwrap(), None)
        .unwrap();
    network
        .add(Dense::with_rng(Activator::Sigmoid, 4, 1, &mut rng).unwrap(), None)
        .unwrap();
    network.set_parameters(Some(0.2), Some(cost)).unwrap();
    network
}

fn weights(network: &FeedForward) -> Vec<Array2<f64>> {
    network
        .layers()
        .iter()
        .map(|layer| layer.weights().to_owned())
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

#[test]
fn xor_cost_trends_downward() {
    for cost in [CostFunction::MeanSquare, CostFunction::CrossEntropy] {
        for seed in 0..3 {
            let mut network = xor_network(seed, cost);
            let set = xor();
            let costs: Vec<f64> = (0..300)
                .map(|_| {
                    network.learn(&set, 4, 1).unwrap();
                    network.test(&set).unwrap()
                })
                .collect();
            let early = mean(&costs[..30]);
            let late = mean(&costs[costs.len() - 30..]);
            assert!(late < early, "{cost:?} seed {seed}: {early} -> {late}");
        }
    }
}

#[test]
fn trainer_learns_xor() {
    let mut network = xor_network(42, CostFunction::CrossEntropy);
    let set = xor();
    let before = network.test(&set).unwrap();
    let report = Trainer::new(&mut network)
        .batch_size(1)
        .learning_rate(0.5)
        .logging(Logging::Silent)
        .stop_condition(StopCondition::Epochs(200))
        .train(&set)
        .unwrap();
    assert_eq!(report.epochs, 200);
    assert_eq!(report.batches, 800);
    assert!(report.last_cost < before);
}

#[test]
fn test_never_mutates_weights() {
    let mut network = xor_network(1, CostFunction::MeanSquare);
    network.learn(&xor(), 2, 10).unwrap();
    let before = weights(&network);
    for _ in 0..3 {
        network.test(&xor()).unwrap();
    }
    assert_eq!(before, weights(&network));
}

#[test]
fn abort_never_leaves_a_partial_update() {
    let mut network = xor_network(5, CostFunction::MeanSquare);
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let handle = network.abort_handle();
    let sink = snapshots.clone();
    network.hooks_mut().register(
        Monitor::WeightMagnitude,
        1,
        Arc::new(move |batch: usize, magnitudes: &[f64]| {
            sink.lock().unwrap().push(magnitudes.to_vec());
            if batch == 5 {
                handle.request();
            }
        }),
    );
    let report = network.learn(&xor(), 1, 10).unwrap();
    assert!(report.aborted);
    assert_eq!(report.batches, 5);
    assert_eq!(report.epochs, 1);

    // Every layer is exactly as the last completed batch left it.
    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 5);
    assert_eq!(snapshots[4], network.weight_magnitudes());
}

#[test]
fn loaded_files_train_like_in_memory_sets() {
    let path = std::env::temp_dir().join(format!("netdesign-xor-{}.txt", std::process::id()));
    fs::write(&path, "0,0;0\n0,1;1\n1,0;1\n1,1;0\n").unwrap();
    let loaded = TrainingSet::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded.len(), 4);
    assert_eq!(loaded.samples()[1].input().to_vec(), vec![0.0, 1.0]);
    assert_eq!(loaded.samples()[1].target().to_vec(), vec![1.0]);

    let mut a = xor_network(9, CostFunction::MeanSquare);
    let mut b = xor_network(9, CostFunction::MeanSquare);
    a.learn(&loaded, 2, 20).unwrap();
    b.learn(&xor(), 2, 20).unwrap();
    assert_eq!(weights(&a), weights(&b));
}

#[test]
fn inconsistent_file_fails_whole_load() {
    let path = std::env::temp_dir().join(format!("netdesign-bad-{}.txt", std::process::id()));
    fs::write(&path, "1,0,1;1\n0,1;0\n").unwrap();
    let result = TrainingSet::load(&path);
    fs::remove_file(&path).unwrap();
    assert!(matches!(
        result,
        Err(netdesign::Error::MalformedTrainingFile { .. })
    ));
}
