//! Pronostico CLI
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! pronostico train run.yaml
//!
//! # Train with overrides
//! pronostico train run.yaml --epochs 10 --lr 0.001
//!
//! # Validate config
//! pronostico validate run.yaml --detailed
//! ```
//!
//! Logging goes to stderr. `-v` enables debug output, `-q` keeps only errors;
//! `RUST_LOG` overrides both.

use clap::Parser;
use pronostico::config::{
    apply_overrides, load_config, run_from_spec, validate_config, Cli, Command, RunSpec,
    TrainArgs, ValidateArgs,
};
use pronostico::nn::Model;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Validate(args) => run_validate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_train(args: TrainArgs) -> Result<(), String> {
    tracing::info!("training from {}", args.config.display());

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);
    validate_config(&spec).map_err(|e| format!("Invalid overrides: {e}"))?;

    if args.dry_run {
        tracing::info!("dry run: config validated successfully");
        print_summary(&spec);
        return Ok(());
    }

    let result = run_from_spec(&spec).map_err(|e| format!("Training error: {e}"))?;
    let history = &result.history;

    if let (Some(train), Some(eval)) = (history.final_train_loss(), history.final_eval_loss()) {
        println!(
            "{} ({} parameters) after {} epochs: train loss {train:.6}, eval loss {eval:.6}",
            result.model.name(),
            result.model.num_parameters(),
            history.epochs()
        );
    }
    if let Some((epoch, loss)) = history.best_eval_loss() {
        println!("best eval loss {loss:.6} at epoch {}", epoch + 1);
    }
    for (name, values) in &history.metrics {
        if let Some(last) = values.last() {
            println!("  {name}: {last:.6}");
        }
    }
    println!("logs written to {}", spec.training.log_dir.display());
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    tracing::info!("validating config: {}", args.config.display());

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    println!("Configuration is valid");

    if args.detailed {
        print_summary(&spec);
    }
    Ok(())
}

fn print_summary(spec: &RunSpec) {
    match serde_yaml::to_string(spec) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => tracing::warn!("could not render config: {e}"),
    }
}
