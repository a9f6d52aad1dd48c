//! Training configuration and run history

use super::EvalReport;
use crate::config::{DataSpec, OptimSpec};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Training configuration
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Number of epochs (one train pass and one eval pass each)
    pub epochs: usize,

    /// Optimizer built at the start of `fit`
    pub optimizer: OptimSpec,

    /// Directory receiving `scalars.jsonl`, `saved_config.yaml` and `model.json`
    pub log_dir: PathBuf,

    /// Maximum gradient norm for clipping (None = no clipping)
    pub max_grad_norm: Option<f32>,

    /// Seed recorded in the snapshot
    pub seed: u64,

    /// Persist trained parameters at the end of `fit`
    pub save_model: bool,

    /// Data section recorded in the snapshot
    pub data: Option<DataSpec>,
}

impl TrainConfig {
    /// Create a new training configuration
    pub fn new(epochs: usize, optimizer: OptimSpec) -> Self {
        Self {
            epochs,
            optimizer,
            log_dir: PathBuf::from("./runs/latest"),
            max_grad_norm: None,
            seed: 42,
            save_model: false,
            data: None,
        }
    }

    /// Set the log directory
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Set gradient clipping norm
    pub fn with_grad_clip(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    /// Disable gradient clipping
    pub fn without_grad_clip(mut self) -> Self {
        self.max_grad_norm = None;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Write `model.json` next to the scalar log
    pub fn with_save_model(mut self, save: bool) -> Self {
        self.save_model = save;
        self
    }

    pub fn with_data(mut self, data: DataSpec) -> Self {
        self.data = Some(data);
        self
    }
}

/// Per-epoch results of a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    /// Training loss history (one per epoch)
    pub train_losses: Vec<f32>,

    /// Evaluation loss history (one per epoch)
    pub eval_losses: Vec<f32>,

    /// Evaluation metric histories keyed by metric name
    pub metrics: BTreeMap<String, Vec<f32>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished epoch
    pub fn record_epoch(&mut self, train_loss: f32, report: &EvalReport) {
        self.train_losses.push(train_loss);
        self.eval_losses.push(report.loss);
        for (name, value) in &report.metrics {
            self.metrics.entry(name.clone()).or_default().push(*value);
        }
    }

    /// Number of recorded epochs
    pub fn epochs(&self) -> usize {
        self.train_losses.len()
    }

    /// Get best (minimum) evaluation loss and its epoch
    pub fn best_eval_loss(&self) -> Option<(usize, f32)> {
        self.eval_losses
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn final_train_loss(&self) -> Option<f32> {
        self.train_losses.last().copied()
    }

    pub fn final_eval_loss(&self) -> Option<f32> {
        self.eval_losses.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(loss: f32, mae: f32) -> EvalReport {
        EvalReport {
            loss,
            metrics: BTreeMap::from([("mae".to_string(), mae)]),
        }
    }

    #[test]
    fn test_config_builder() {
        let config = TrainConfig::new(5, OptimSpec::new("sgd", 0.1))
            .with_log_dir("/tmp/run")
            .with_grad_clip(1.0)
            .with_seed(3)
            .with_save_model(true);

        assert_eq!(config.epochs, 5);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/run"));
        assert_eq!(config.max_grad_norm, Some(1.0));
        assert_eq!(config.seed, 3);
        assert!(config.save_model);
        assert!(config.without_grad_clip().max_grad_norm.is_none());
    }

    #[test]
    fn test_history_records_epochs() {
        let mut history = History::new();
        history.record_epoch(1.0, &report(0.9, 0.5));
        history.record_epoch(0.8, &report(0.7, 0.4));
        history.record_epoch(0.6, &report(0.75, 0.45));

        assert_eq!(history.epochs(), 3);
        assert_eq!(history.metrics["mae"], vec![0.5, 0.4, 0.45]);
        assert_eq!(history.best_eval_loss(), Some((1, 0.7)));
        assert_eq!(history.final_train_loss(), Some(0.6));
        assert_eq!(history.final_eval_loss(), Some(0.75));
    }

    #[test]
    fn test_empty_history() {
        let history = History::new();
        assert_eq!(history.epochs(), 0);
        assert!(history.best_eval_loss().is_none());
    }
}
