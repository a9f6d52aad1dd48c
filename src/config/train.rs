//! Single-command training from YAML configuration

use super::builder::{build_model, build_trainer};
use super::schema::{ModelSpec, RunSpec};
use super::validate::validate_config;
use crate::data::{sine_series, sliding_windows, split_samples, BatchLoader, InputLayout};
use crate::error::{Error, Result};
use crate::nn::Model;
use crate::train::FitResult;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse and validate a YAML document
pub fn parse_config(yaml: &str) -> Result<RunSpec> {
    let spec: RunSpec = serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {}", e)))?;

    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {}", e)))?;

    Ok(spec)
}

/// Load a run spec from a YAML file (without running training)
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<RunSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    parse_config(&yaml_content)
}

/// Write a run spec as YAML
pub fn save_config<P: AsRef<Path>>(spec: &RunSpec, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(spec)
        .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
    fs::write(path.as_ref(), yaml)?;
    debug!(path = %path.as_ref().display(), "saved config");
    Ok(())
}

/// Train a model on the synthetic series described by `spec.data`
///
/// This is the entry point behind `pronostico train`:
/// 1. Generates the series and cuts it into windows
/// 2. Splits the windows chronologically into train and eval loaders
/// 3. Builds the model and trainer
/// 4. Runs [`Trainer::fit`](crate::train::Trainer::fit)
///
/// `spec` is expected to have passed [`validate_config`].
pub fn run_from_spec(spec: &RunSpec) -> Result<FitResult<Box<dyn Model>>> {
    let data = spec.data.as_ref().ok_or_else(|| {
        Error::ConfigError("the `data` section is required to train from a config".into())
    })?;
    let seed = spec.training.seed;

    let series = sine_series(data.length, data.noise, seed);
    let samples = sliding_windows(&series, data.window, data.horizon)?;
    let (train, eval) = split_samples(samples, data.train_fraction);
    info!(
        train = train.len(),
        eval = eval.len(),
        window = data.window,
        horizon = data.horizon,
        "prepared synthetic series"
    );

    let layout = match spec.model {
        ModelSpec::Baseline { .. } => InputLayout::Flat,
        ModelSpec::Recurrent { .. } => InputLayout::Sequence,
    };
    let mut train_loader = BatchLoader::new(train, data.batch_size, layout)?;
    if data.shuffle {
        train_loader = train_loader.with_shuffle(seed);
    }
    let eval_loader = BatchLoader::new(eval, data.batch_size, layout)?;

    let model = build_model(&spec.model, seed)?;
    info!(
        model = spec.model.kind(),
        parameters = model.num_parameters(),
        "built model"
    );

    let trainer = build_trainer(spec)?;
    trainer.fit(model, || train_loader.batches(), || eval_loader.batches())
}
