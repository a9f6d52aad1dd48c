//! Declarative YAML configuration
//!
//! A run is described by one YAML document, validated once at startup and
//! turned into an explicit [`Trainer`](crate::train::Trainer) configuration.
//!
//! # Example
//!
//! ```yaml
//! model:
//!   kind: recurrent
//!   input_size: 1
//!   hidden_size: 16
//!   num_layers: 2
//!   horizon: 1
//!
//! optimizer:
//!   name: adam
//!   lr: 0.001
//!
//! training:
//!   epochs: 10
//!   log_dir: ./runs/latest
//!   metrics: [mae, rmse]
//!   grad_clip: 1.0
//!
//! data:
//!   length: 400
//!   window: 12
//!   batch_size: 32
//! ```

mod builder;
mod cli;
mod schema;
mod train;
mod validate;



pub use builder::{build_loss, build_metrics, build_model, build_optimizer, build_trainer};
pub use cli::{apply_overrides, parse_args, Cli, Command, TrainArgs, ValidateArgs};
pub use schema::{DataSpec, ModelSpec, OptimSpec, RunSpec, TrainingParams};
pub use train::{load_config, parse_config, run_from_spec, save_config};
pub use validate::{validate_config, ValidationError, LOSSES, METRICS, OPTIMIZERS};
