//! # Pronostico: training harness for sequence-regression models
//!
//! Pronostico trains small forecasters over windows of a time series: a
//! flatten + linear baseline and a stacked RNN with a linear head. Models are
//! differentiated by a tape-based autograd engine and driven by an epoch loop
//! that logs scalars and snapshots its configuration.
//!
//! ## Architecture
//!
//! - **autograd**: Tape-based automatic differentiation
//! - **nn**: `Model` trait, baseline and recurrent models
//! - **optim**: Optimizers (SGD, Adam, AdamW) and gradient clipping
//! - **train**: Losses, metrics, batch trainer/evaluator and the epoch driver
//! - **monitor**: Scalar logging sinks (`scalars.jsonl`, in-memory)
//! - **data**: Sliding windows, synthetic series and batch loading
//! - **config**: Declarative YAML configuration and the CLI schema
//! - **io**: Model saving and loading (JSON, YAML formats)

pub mod autograd;
pub mod config;
pub mod data;
pub mod io;
pub mod monitor;
pub mod nn;
pub mod optim;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use autograd::{backward, no_grad, Tensor};
pub use error::{Error, Result};
