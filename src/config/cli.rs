//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! pronostico train run.yaml
//! pronostico train run.yaml --epochs 20 --log-dir ./runs/rnn
//! pronostico train run.yaml --dry-run
//! pronostico validate run.yaml --detailed
//! ```

use super::schema::RunSpec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pronostico: training harness for sequence-regression models
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pronostico")]
#[command(version)]
#[command(about = "Train baseline and recurrent forecasters from a YAML run config")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train a model from YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override log directory
    #[arg(short = 'o', long)]
    pub log_dir: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Override random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Save trained parameters to model.json in the log directory
    #[arg(long)]
    pub save_model: bool,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the resolved configuration, defaults included
    #[arg(short, long)]
    pub detailed: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a RunSpec
///
/// Callers validate the spec afterwards.
pub fn apply_overrides(spec: &mut RunSpec, args: &TrainArgs) {
    if let Some(log_dir) = &args.log_dir {
        spec.training.log_dir = log_dir.clone();
    }
    if let Some(epochs) = args.epochs {
        spec.training.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        if let Some(data) = spec.data.as_mut() {
            data.batch_size = batch_size;
        }
    }
    if let Some(lr) = args.lr {
        spec.optimizer.lr = lr;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = seed;
    }
    if args.save_model {
        spec.training.save_model = true;
    }
}
