//! Configuration validation

use super::schema::{DataSpec, ModelSpec, RunSpec};
use std::collections::HashSet;

/// Optimizer names accepted by `build_optimizer`
pub const OPTIMIZERS: [&str; 3] = ["adam", "adamw", "sgd"];

/// Loss names accepted by `build_loss`
pub const LOSSES: [&str; 2] = ["mse", "l1"];

/// Metric names accepted by `build_metrics`
pub const METRICS: [&str; 3] = ["mae", "rmse", "r2"];

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid learning rate: {0} (must be > 0.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid optimizer: {0} (must be one of: adam, adamw, sgd)")]
    InvalidOptimizer(String),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid loss: {0} (must be one of: mse, l1)")]
    InvalidLoss(String),

    #[error("Invalid metric: {0} (must be one of: mae, rmse, r2)")]
    InvalidMetric(String),

    #[error("Duplicate metric: {0}")]
    DuplicateMetric(String),

    #[error("Invalid {field}: {value} (must be > 0)")]
    InvalidSize { field: &'static str, value: usize },

    #[error("Invalid train fraction: {0} (must be in (0, 1))")]
    InvalidTrainFraction(f32),

    #[error("Invalid noise: {0} (must be >= 0.0)")]
    InvalidNoise(f32),

    #[error("Series of length {length} yields no window of {window} + {horizon}")]
    SeriesTooShort {
        length: usize,
        window: usize,
        horizon: usize,
    },

    #[error("Data does not fit the model: {0}")]
    DataModelMismatch(String),
}

fn positive(field: &'static str, value: usize) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::InvalidSize { field, value });
    }
    Ok(())
}

/// Validate a run specification
///
/// Checks:
/// - Numeric values are in valid ranges
/// - Optimizer, loss and metric names are known, metric names unique
/// - The data section, when present, produces inputs the model accepts
pub fn validate_config(spec: &RunSpec) -> Result<(), ValidationError> {
    // Validate learning rate
    if spec.optimizer.lr <= 0.0 || !spec.optimizer.lr.is_finite() {
        return Err(ValidationError::InvalidLearningRate(spec.optimizer.lr));
    }

    // Validate optimizer name
    if !OPTIMIZERS.contains(&spec.optimizer.name.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidOptimizer(
            spec.optimizer.name.clone(),
        ));
    }

    // Validate epochs
    if spec.training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(spec.training.epochs));
    }

    // Validate gradient clipping
    if let Some(grad_clip) = spec.training.grad_clip {
        if !(grad_clip > 0.0 && grad_clip.is_finite()) {
            return Err(ValidationError::InvalidGradClip(grad_clip));
        }
    }

    if !LOSSES.contains(&spec.training.loss.as_str()) {
        return Err(ValidationError::InvalidLoss(spec.training.loss.clone()));
    }

    let mut seen = HashSet::new();
    for metric in &spec.training.metrics {
        if !METRICS.contains(&metric.as_str()) {
            return Err(ValidationError::InvalidMetric(metric.clone()));
        }
        if !seen.insert(metric.as_str()) {
            return Err(ValidationError::DuplicateMetric(metric.clone()));
        }
    }

    validate_model(&spec.model)?;

    if let Some(data) = &spec.data {
        validate_data(data)?;
        check_data_fits_model(data, &spec.model)?;
    }

    Ok(())
}

fn validate_model(model: &ModelSpec) -> Result<(), ValidationError> {
    match *model {
        ModelSpec::Baseline {
            observations,
            horizon,
        } => {
            positive("observations", observations)?;
            positive("horizon", horizon)
        }
        ModelSpec::Recurrent {
            input_size,
            hidden_size,
            num_layers,
            horizon,
        } => {
            positive("input_size", input_size)?;
            positive("hidden_size", hidden_size)?;
            positive("num_layers", num_layers)?;
            positive("horizon", horizon)
        }
    }
}

fn validate_data(data: &DataSpec) -> Result<(), ValidationError> {
    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }
    positive("window", data.window)?;
    positive("horizon", data.horizon)?;

    if !(data.train_fraction > 0.0 && data.train_fraction < 1.0) {
        return Err(ValidationError::InvalidTrainFraction(data.train_fraction));
    }
    if data.noise < 0.0 || !data.noise.is_finite() {
        return Err(ValidationError::InvalidNoise(data.noise));
    }

    // train and eval splits each need at least one window
    if data.length < data.window + data.horizon + 1 {
        return Err(ValidationError::SeriesTooShort {
            length: data.length,
            window: data.window,
            horizon: data.horizon,
        });
    }

    Ok(())
}

fn check_data_fits_model(data: &DataSpec, model: &ModelSpec) -> Result<(), ValidationError> {
    if data.horizon != model.horizon() {
        return Err(ValidationError::DataModelMismatch(format!(
            "data horizon {} != model horizon {}",
            data.horizon,
            model.horizon()
        )));
    }

    match *model {
        ModelSpec::Baseline { observations, .. } if observations != data.window => {
            Err(ValidationError::DataModelMismatch(format!(
                "baseline observations {} != data window {}",
                observations, data.window
            )))
        }
        ModelSpec::Recurrent { input_size, .. } if input_size != 1 => {
            Err(ValidationError::DataModelMismatch(format!(
                "synthetic series has 1 feature, recurrent input_size is {input_size}"
            )))
        }
        _ => Ok(()),
    }
}
