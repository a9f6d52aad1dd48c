//! Contents and lifecycle of a run's log directory.

use pronostico::config::{load_config, ModelSpec, OptimSpec};
use pronostico::io::load_model;
use pronostico::monitor::SCALARS_FILE;
use pronostico::nn::{Model, Recurrent};
use pronostico::train::{Batch, TrainConfig, Trainer, MODEL_FILE, RMSE, SNAPSHOT_FILE};
use pronostico::{Error, Tensor};
use std::fs;
use tempfile::TempDir;

fn sequence_batches() -> Vec<Batch> {
    vec![
        Batch::new(
            Tensor::from_shape_vec([2, 3, 1], vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5], false).unwrap(),
            Tensor::from_shape_vec([2, 1], vec![0.3, 0.6], false).unwrap(),
        ),
        Batch::new(
            Tensor::from_shape_vec([1, 3, 1], vec![0.6, 0.7, 0.8], false).unwrap(),
            Tensor::from_shape_vec([1, 1], vec![0.9], false).unwrap(),
        ),
    ]
}

fn trainer(log_dir: &std::path::Path, epochs: usize) -> Trainer {
    let config = TrainConfig::new(epochs, OptimSpec::new("sgd", 0.05).with_param("momentum", 0.5))
        .with_log_dir(log_dir)
        .with_grad_clip(5.0)
        .with_seed(17)
        .with_save_model(true);
    let mut trainer = Trainer::new(config);
    trainer.add_metric(Box::new(RMSE)).unwrap();
    trainer
}

#[test]
fn test_fit_writes_scalars_snapshot_and_model() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("run");

    let result = trainer(&log_dir, 3)
        .fit(
            Recurrent::new(1, 4, 2, 1, 17).unwrap(),
            sequence_batches,
            sequence_batches,
        )
        .unwrap();

    assert!(log_dir.join(SCALARS_FILE).is_file());

    let snapshot = load_config(log_dir.join(SNAPSHOT_FILE)).unwrap();
    assert_eq!(
        snapshot.model,
        ModelSpec::Recurrent {
            input_size: 1,
            hidden_size: 4,
            num_layers: 2,
            horizon: 1,
        }
    );
    assert_eq!(snapshot.optimizer.name, "sgd");
    assert_eq!(snapshot.optimizer.param_f32("momentum", 0.0), 0.5);
    assert_eq!(snapshot.training.epochs, 3);
    assert_eq!(snapshot.training.seed, 17);
    assert_eq!(snapshot.training.grad_clip, Some(5.0));
    assert_eq!(snapshot.training.metrics, vec!["rmse"]);
    assert_eq!(snapshot.training.log_dir, log_dir);

    let restored = load_model(log_dir.join(MODEL_FILE)).unwrap();
    assert_eq!(restored.spec(), result.model.spec());
    for (saved, trained) in restored.parameters().iter().zip(result.model.parameters()) {
        assert_eq!(saved.shape(), trained.shape());
        assert_eq!(saved.data(), trained.data());
    }

    let x = &sequence_batches()[0].inputs;
    assert_eq!(
        restored.forward(x).unwrap().data(),
        result.model.forward(x).unwrap().data()
    );
}

#[test]
fn test_fit_clears_previous_run() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("run");
    fs::create_dir_all(log_dir.join("old")).unwrap();
    fs::write(log_dir.join("stale.txt"), "previous run").unwrap();

    trainer(&log_dir, 1)
        .fit(
            Recurrent::new(1, 2, 1, 1, 0).unwrap(),
            sequence_batches,
            sequence_batches,
        )
        .unwrap();

    assert!(!log_dir.join("stale.txt").exists());
    assert!(!log_dir.join("old").exists());

    let mut names: Vec<String> = fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec![MODEL_FILE, SNAPSHOT_FILE, SCALARS_FILE]);
}

#[test]
fn test_shape_mismatch_aborts_without_snapshot() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("run");
    let wrong_features = || {
        vec![Batch::new(
            Tensor::from_shape_vec([1, 3, 2], vec![0.0; 6], false).unwrap(),
            Tensor::from_shape_vec([1, 1], vec![0.0], false).unwrap(),
        )]
    };

    let result = trainer(&log_dir, 2).fit(
        Recurrent::new(1, 2, 1, 1, 0).unwrap(),
        wrong_features,
        wrong_features,
    );

    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    assert!(!log_dir.join(SNAPSHOT_FILE).exists());
    assert!(!log_dir.join(MODEL_FILE).exists());
}
