//! YAML schema definitions for declarative training configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Complete run specification
///
/// This is also the shape of the `saved_config.yaml` snapshot written at the
/// end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Model architecture
    pub model: ModelSpec,

    /// Optimizer configuration
    pub optimizer: OptimSpec,

    /// Training hyperparameters
    #[serde(default)]
    pub training: TrainingParams,

    /// Synthetic series used by the `train` command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataSpec>,
}

/// Model architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    /// Flatten + linear
    Baseline {
        /// Flattened input width
        observations: usize,
        horizon: usize,
    },

    /// Stacked RNN + linear head on the last timestep
    Recurrent {
        input_size: usize,
        hidden_size: usize,
        #[serde(default = "default_num_layers")]
        num_layers: usize,
        horizon: usize,
    },
}

impl ModelSpec {
    pub fn horizon(&self) -> usize {
        match self {
            ModelSpec::Baseline { horizon, .. } | ModelSpec::Recurrent { horizon, .. } => *horizon,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::Baseline { .. } => "baseline",
            ModelSpec::Recurrent { .. } => "recurrent",
        }
    }
}

/// Optimizer specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimSpec {
    /// Optimizer name: "adam" | "adamw" | "sgd"
    pub name: String,

    /// Learning rate
    pub lr: f32,

    /// Optimizer-specific parameters (beta1, beta2, eps, momentum, weight_decay)
    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl OptimSpec {
    /// Spec with no optimizer-specific parameters
    pub fn new(name: impl Into<String>, lr: f32) -> Self {
        Self {
            name: name.into(),
            lr,
            params: HashMap::new(),
        }
    }

    /// Add an optimizer-specific parameter
    pub fn with_param(mut self, key: &str, value: f64) -> Self {
        self.params.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Numeric parameter, or `default` when absent
    pub fn param_f32(&self, key: &str, default: f32) -> f32 {
        self.params
            .get(key)
            .and_then(|v| v.as_f64())
            .map(|v| v as f32)
            .unwrap_or(default)
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Number of epochs
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Directory receiving the scalar log and the config snapshot
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Loss name: "mse" | "l1"
    #[serde(default = "default_loss")]
    pub loss: String,

    /// Evaluation metric names: "mae" | "rmse" | "r2"
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,

    /// Seed for parameter initialization and shuffling
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Gradient clipping threshold (global norm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad_clip: Option<f32>,

    /// Persist trained parameters to `model.json` in the log directory
    #[serde(default)]
    pub save_model: bool,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            log_dir: default_log_dir(),
            loss: default_loss(),
            metrics: default_metrics(),
            seed: default_seed(),
            grad_clip: None,
            save_model: false,
        }
    }
}

/// Synthetic sine series and windowing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Number of points in the generated series
    #[serde(default = "default_length")]
    pub length: usize,

    /// Observations per input window
    #[serde(default = "default_window")]
    pub window: usize,

    /// Values predicted per window
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Share of windows used for training, the rest for evaluation
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f32,

    /// Standard deviation of additive noise
    #[serde(default = "default_noise")]
    pub noise: f32,

    /// Shuffle training batches each epoch
    #[serde(default = "default_true")]
    pub shuffle: bool,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            length: default_length(),
            window: default_window(),
            horizon: default_horizon(),
            batch_size: default_batch_size(),
            train_fraction: default_train_fraction(),
            noise: default_noise(),
            shuffle: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_num_layers() -> usize {
    1
}

fn default_epochs() -> usize {
    10
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./runs/latest")
}

fn default_loss() -> String {
    "mse".to_string()
}

fn default_metrics() -> Vec<String> {
    vec!["mae".to_string(), "rmse".to_string()]
}

fn default_seed() -> u64 {
    42
}

fn default_length() -> usize {
    400
}

fn default_window() -> usize {
    12
}

fn default_horizon() -> usize {
    1
}

fn default_batch_size() -> usize {
    32
}

fn default_train_fraction() -> f32 {
    0.8
}

fn default_noise() -> f32 {
    0.05
}
