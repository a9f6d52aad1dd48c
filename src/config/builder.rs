//! Build training components from configuration

use super::schema::{ModelSpec, OptimSpec, RunSpec};
use crate::error::{Error, Result};
use crate::nn::{Baseline, Model, Recurrent};
use crate::optim::{Adam, Optimizer, SGD};
use crate::train::{L1Loss, LossFn, MSELoss, Metric, R2Score, TrainConfig, Trainer, MAE, RMSE};

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimSpec) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "sgd" => {
            let momentum = spec.param_f32("momentum", 0.0);
            Ok(Box::new(SGD::new(spec.lr, momentum)))
        }
        name @ ("adam" | "adamw") => {
            let beta1 = spec.param_f32("beta1", 0.9);
            let beta2 = spec.param_f32("beta2", 0.999);
            let eps = spec.param_f32("eps", 1e-8);
            let adam = Adam::new(spec.lr, beta1, beta2, eps);

            if name == "adamw" {
                let weight_decay = spec.param_f32("weight_decay", 0.01);
                Ok(Box::new(adam.with_weight_decay(weight_decay)))
            } else {
                Ok(Box::new(adam))
            }
        }
        name => Err(Error::ConfigError(format!(
            "Unknown optimizer: {}. Supported: sgd, adam, adamw",
            name
        ))),
    }
}

/// Build a freshly initialized model
pub fn build_model(spec: &ModelSpec, seed: u64) -> Result<Box<dyn Model>> {
    let model: Box<dyn Model> = match *spec {
        ModelSpec::Baseline {
            observations,
            horizon,
        } => Box::new(Baseline::new(observations, horizon, seed)?),
        ModelSpec::Recurrent {
            input_size,
            hidden_size,
            num_layers,
            horizon,
        } => Box::new(Recurrent::new(
            input_size,
            hidden_size,
            num_layers,
            horizon,
            seed,
        )?),
    };
    Ok(model)
}

/// Build a loss function by name
pub fn build_loss(name: &str) -> Result<Box<dyn LossFn>> {
    match name {
        "mse" => Ok(Box::new(MSELoss)),
        "l1" => Ok(Box::new(L1Loss)),
        other => Err(Error::ConfigError(format!(
            "Unknown loss: {}. Supported: mse, l1",
            other
        ))),
    }
}

/// Build built-in metrics by name
pub fn build_metrics(names: &[String]) -> Result<Vec<Box<dyn Metric>>> {
    names
        .iter()
        .map(|name| -> Result<Box<dyn Metric>> {
            match name.as_str() {
                "mae" => Ok(Box::new(MAE)),
                "rmse" => Ok(Box::new(RMSE)),
                "r2" => Ok(Box::new(R2Score)),
                other => Err(Error::ConfigError(format!(
                    "Unknown metric: {}. Supported: mae, rmse, r2",
                    other
                ))),
            }
        })
        .collect()
}

/// Build a trainer carrying everything in `spec` except the model and data
pub fn build_trainer(spec: &RunSpec) -> Result<Trainer> {
    let training = &spec.training;
    let mut config = TrainConfig::new(training.epochs, spec.optimizer.clone())
        .with_log_dir(training.log_dir.clone())
        .with_seed(training.seed)
        .with_save_model(training.save_model);
    if let Some(max_norm) = training.grad_clip {
        config = config.with_grad_clip(max_norm);
    }
    if let Some(data) = &spec.data {
        config = config.with_data(data.clone());
    }

    let mut trainer = Trainer::new(config);
    trainer.set_loss(build_loss(&training.loss)?);
    for metric in build_metrics(&training.metrics)? {
        trainer.add_metric(metric)?;
    }
    Ok(trainer)
}
