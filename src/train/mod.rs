//! High-level training loop
//!
//! This module provides the supervised epoch loop:
//! - Loss functions (MSE, L1)
//! - Regression metrics with explicit names
//! - Batch trainer ([`train_batches`]) and batch evaluator ([`eval_batches`])
//! - Epoch driver ([`Trainer`]) with scalar logging and a config snapshot
//!
//! # Example
//!
//! ```
//! use pronostico::config::OptimSpec;
//! use pronostico::monitor::InMemoryScalars;
//! use pronostico::nn::Baseline;
//! use pronostico::train::{Batch, TrainConfig, Trainer, RMSE};
//! use pronostico::Tensor;
//!
//! let batches = vec![Batch::new(
//!     Tensor::from_shape_vec([3, 1], vec![-1.0, 0.0, 1.0], false).unwrap(),
//!     Tensor::from_shape_vec([3, 1], vec![-1.0, 0.0, 1.0], false).unwrap(),
//! )];
//!
//! let mut trainer = Trainer::new(TrainConfig::new(3, OptimSpec::new("sgd", 0.1)));
//! trainer.add_metric(Box::new(RMSE)).unwrap();
//!
//! let mut sink = InMemoryScalars::new();
//! let result = trainer
//!     .fit_with_sink(Baseline::new(1, 1, 0).unwrap(), || batches.clone(), || batches.clone(), &mut sink)
//!     .unwrap();
//!
//! assert_eq!(result.history.epochs(), 3);
//! assert_eq!(sink.count("metric/rmse"), 3);
//! ```

mod batch;
mod config;
mod loss;
mod metrics;
mod trainer;

#[cfg(test)]
mod tests;

pub use batch::Batch;
pub use config::{History, TrainConfig};
pub use loss::{L1Loss, LossFn, MSELoss};
pub use metrics::{check_unique_names, Metric, MetricAccumulator, NamedMetric, R2Score, MAE, RMSE};
pub use trainer::{
    eval_batches, train_batches, EvalReport, FitResult, Trainer, MODEL_FILE, SNAPSHOT_FILE,
};
