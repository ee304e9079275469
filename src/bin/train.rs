use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use netdesign::config::NetworkConfig;
use netdesign::prelude::*;
use netdesign::session::Session;

/// Trains a feed-forward network described by a JSON config on a delimited
/// training file (`input;target` per line).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Network topology and parameters, as JSON.
    #[arg(long)]
    config: PathBuf,
    /// Training samples.
    #[arg(long)]
    train: PathBuf,
    /// Held-out samples, reported while training.
    #[arg(long)]
    test: Option<PathBuf>,
    #[arg(long, default_value_t = 100)]
    epochs: usize,
    #[arg(long, default_value_t = 1)]
    batch_size: usize,
    /// Log telemetry every this many batches.
    #[arg(long, default_value_t = 100)]
    log_every: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let json = fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let network = NetworkConfig::from_json(&json)?.build()?;

    let mut session = Session::new();
    session.set_network(network);
    session.sample_every = args.log_every;
    session.test_sample_every = args.log_every;

    if !session.load_training_set("train", &args.train) {
        bail!("could not load training data from {}", args.train.display());
    }
    session.select_training_set("train")?;

    session.add_weight_monitor(Arc::new(|batch: usize, magnitudes: &[f64]| {
        info!("batch {batch}: weight magnitudes {magnitudes:.4?}");
    }))?;
    if let Some(test) = &args.test {
        if !session.load_test_set("test", test) {
            bail!("could not load test data from {}", test.display());
        }
        session.select_test_set("test")?;
        session.add_test_monitor(Arc::new(|batch: usize, error: &[f64]| {
            info!("batch {batch}: test cost {:.6}", error[0]);
        }))?;
    }

    let report = session.train(args.epochs, args.batch_size)?;
    println!(
        "trained {} epochs ({} batches), training cost {:.6}",
        report.epochs, report.batches, report.last_cost
    );

    if let Some(test_set) = session.selected_test_set().cloned() {
        let cost = session.network_mut()?.test(&test_set)?;
        println!("test cost {cost:.6}");
    }
    Ok(())
}
