//! End-to-end training runs checked through the files they leave behind.

use pronostico::config::OptimSpec;
use pronostico::data::{sine_series, sliding_windows, split_samples, BatchLoader, InputLayout};
use pronostico::monitor::{read_scalars, ScalarRecord, SCALARS_FILE};
use pronostico::nn::{Baseline, Recurrent};
use pronostico::train::{Batch, NamedMetric, TrainConfig, Trainer, MAE, RMSE};
use pronostico::Tensor;
use tempfile::TempDir;

fn identity_batches() -> Vec<Batch> {
    let xs = vec![-1.0, -0.5, 0.0, 0.5, 1.0];
    vec![Batch::new(
        Tensor::from_shape_vec([5, 1], xs.clone(), false).unwrap(),
        Tensor::from_shape_vec([5, 1], xs, false).unwrap(),
    )]
}

fn series_for(tag: &str, records: &[ScalarRecord]) -> Vec<(usize, f32)> {
    records
        .iter()
        .filter(|r| r.tag == tag)
        .map(|r| (r.step, r.value))
        .collect()
}

#[test]
fn test_scalar_log_has_one_entry_per_epoch_and_tag() {
    let dir = TempDir::new().unwrap();
    let config = TrainConfig::new(4, OptimSpec::new("sgd", 0.1)).with_log_dir(dir.path());
    let mut trainer = Trainer::new(config);
    trainer.add_metric(Box::new(MAE)).unwrap();
    trainer
        .add_metric(Box::new(NamedMetric::new("max_error", |targets, predictions| {
            targets
                .data()
                .iter()
                .zip(predictions.data().iter())
                .map(|(t, p)| (t - p).abs())
                .fold(0.0, f32::max)
        })))
        .unwrap();

    let result = trainer
        .fit(Baseline::new(1, 1, 42).unwrap(), identity_batches, identity_batches)
        .unwrap();

    let records = read_scalars(dir.path().join(SCALARS_FILE)).unwrap();
    assert_eq!(records.len(), 4 * 4);

    let steps: Vec<usize> = (0..4).collect();
    for tag in ["Loss/train", "Loss/test", "metric/mae", "metric/max_error"] {
        let series = series_for(tag, &records);
        let logged: Vec<usize> = series.iter().map(|(step, _)| *step).collect();
        assert_eq!(logged, steps, "{tag}");
    }

    let logged_train: Vec<f32> = series_for("Loss/train", &records)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    assert_eq!(logged_train, result.history.train_losses);
    assert_eq!(result.history.metrics["max_error"].len(), 4);
}

#[test]
fn test_train_loss_strictly_decreases_on_identity_data() {
    let dir = TempDir::new().unwrap();
    let config = TrainConfig::new(5, OptimSpec::new("sgd", 0.1)).with_log_dir(dir.path());
    let trainer = Trainer::new(config);

    trainer
        .fit(Baseline::new(1, 1, 42).unwrap(), identity_batches, identity_batches)
        .unwrap();

    let records = read_scalars(dir.path().join(SCALARS_FILE)).unwrap();
    let losses: Vec<f32> = series_for("Loss/train", &records)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    assert_eq!(losses.len(), 5);
    for pair in losses.windows(2) {
        assert!(pair[1] < pair[0], "loss did not decrease: {losses:?}");
    }
}

#[test]
fn test_recurrent_model_learns_sine() {
    let dir = TempDir::new().unwrap();
    let series = sine_series(200, 0.0, 3);
    let samples = sliding_windows(&series, 8, 1).unwrap();
    let (train, eval) = split_samples(samples, 0.8);
    let train = BatchLoader::new(train, 16, InputLayout::Sequence)
        .unwrap()
        .with_shuffle(3);
    let eval = BatchLoader::new(eval, 16, InputLayout::Sequence).unwrap();

    let config = TrainConfig::new(15, OptimSpec::new("adam", 0.02))
        .with_log_dir(dir.path())
        .with_grad_clip(1.0);
    let mut trainer = Trainer::new(config);
    trainer.add_metric(Box::new(RMSE)).unwrap();

    let result = trainer
        .fit(
            Recurrent::new(1, 8, 1, 1, 3).unwrap(),
            || train.batches(),
            || eval.batches(),
        )
        .unwrap();

    let history = &result.history;
    let first = history.eval_losses[0];
    let last = history.final_eval_loss().unwrap();
    assert!(last < first, "eval loss went from {first} to {last}");
    assert!(history.train_losses.iter().all(|l| l.is_finite()));
}

#[test]
fn test_diverged_run_log_reads_back() {
    let dir = TempDir::new().unwrap();
    let wide_batches = || {
        let xs = vec![-1e3, -5e2, 5e2, 1e3];
        vec![Batch::new(
            Tensor::from_shape_vec([4, 1], xs.clone(), false).unwrap(),
            Tensor::from_shape_vec([4, 1], xs, false).unwrap(),
        )]
    };
    let config = TrainConfig::new(30, OptimSpec::new("sgd", 10.0)).with_log_dir(dir.path());

    let result = Trainer::new(config)
        .fit(Baseline::new(1, 1, 42).unwrap(), wide_batches, wide_batches)
        .unwrap();
    assert!(result.history.train_losses.iter().any(|l| !l.is_finite()));

    let records = read_scalars(dir.path().join(SCALARS_FILE)).unwrap();
    let logged: Vec<f32> = series_for("Loss/train", &records)
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    assert_eq!(logged.len(), 30);
    for (logged, kept) in logged.iter().zip(&result.history.train_losses) {
        assert!(logged == kept || (logged.is_nan() && kept.is_nan()));
    }
}
