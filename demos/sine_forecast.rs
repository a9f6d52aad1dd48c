//! Sine Forecast Example
//!
//! Trains the baseline and the recurrent model on the same noisy sine wave
//! and compares their evaluation losses.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example sine_forecast
//! ```
//!
//! Or use the CLI with a YAML run config:
//! ```bash
//! pronostico train run.yaml
//! ```

use pronostico::config::OptimSpec;
use pronostico::data::{sine_series, sliding_windows, split_samples, BatchLoader, InputLayout};
use pronostico::nn::{Baseline, Model, Recurrent};
use pronostico::train::{FitResult, TrainConfig, Trainer, MAE, RMSE};
use std::path::Path;

const WINDOW: usize = 12;
const HORIZON: usize = 1;
const SEED: u64 = 42;

fn main() -> pronostico::Result<()> {
    println!("Sine Forecast Example");
    println!("=====================\n");

    let series = sine_series(400, 0.05, SEED);
    let samples = sliding_windows(&series, WINDOW, HORIZON)?;
    let (train, eval) = split_samples(samples, 0.8);
    println!("{} train windows, {} eval windows\n", train.len(), eval.len());

    let runs = std::env::temp_dir().join("pronostico-sine-forecast");

    let baseline = fit(
        Baseline::new(WINDOW, HORIZON, SEED)?,
        &train,
        &eval,
        InputLayout::Flat,
        OptimSpec::new("sgd", 0.05).with_param("momentum", 0.9),
        &runs.join("baseline"),
    )?;
    report(&baseline);

    let recurrent = fit(
        Recurrent::new(1, 16, 1, HORIZON, SEED)?,
        &train,
        &eval,
        InputLayout::Sequence,
        OptimSpec::new("adam", 0.01),
        &runs.join("recurrent"),
    )?;
    report(&recurrent);

    println!("\nScalar logs and config snapshots in {}", runs.display());
    Ok(())
}

fn fit<M: Model>(
    model: M,
    train: &[pronostico::data::Sample],
    eval: &[pronostico::data::Sample],
    layout: InputLayout,
    optimizer: OptimSpec,
    log_dir: &Path,
) -> pronostico::Result<FitResult<M>> {
    let train_loader = BatchLoader::new(train.to_vec(), 32, layout)?.with_shuffle(SEED);
    let eval_loader = BatchLoader::new(eval.to_vec(), 32, layout)?;

    let config = TrainConfig::new(20, optimizer)
        .with_log_dir(log_dir)
        .with_grad_clip(1.0)
        .with_seed(SEED);
    let mut trainer = Trainer::new(config);
    trainer.add_metric(Box::new(MAE))?;
    trainer.add_metric(Box::new(RMSE))?;

    trainer.fit(model, || train_loader.batches(), || eval_loader.batches())
}

fn report<M: Model>(result: &FitResult<M>) {
    let history = &result.history;
    println!(
        "{:<10} params={:<5} final train={:.5} eval={:.5} rmse={:.5}",
        result.model.name(),
        result.model.num_parameters(),
        history.final_train_loss().unwrap_or(f32::NAN),
        history.final_eval_loss().unwrap_or(f32::NAN),
        history
            .metrics
            .get("rmse")
            .and_then(|v| v.last())
            .copied()
            .unwrap_or(f32::NAN),
    );
}
