//! Regression metrics for evaluation passes
//!
//! Every metric carries an explicit display name; names key the per-pass
//! accumulator and the logged `metric/<name>` series.

use crate::error::{Error, Result};
use crate::Tensor;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;

/// Trait for evaluation metrics
pub trait Metric {
    /// Compute the metric given predictions and targets
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32;

    /// Display name of the metric
    fn name(&self) -> &str;

    /// Whether higher values are better (true) or lower (false)
    fn higher_is_better(&self) -> bool {
        false
    }
}

fn paired<'a>(
    predictions: &'a Tensor,
    targets: &'a Tensor,
) -> impl Iterator<Item = (f32, f32)> + 'a {
    assert_eq!(
        predictions.len(),
        targets.len(),
        "Predictions and targets must have same length"
    );
    predictions
        .data()
        .iter()
        .copied()
        .zip(targets.data().iter().copied())
}

/// R² (coefficient of determination)
///
/// R² = 1 - SS_res / SS_tot
///
/// R² = 1.0 is perfect prediction, 0.0 means predicting the mean
///
/// # Example
///
/// ```
/// use pronostico::train::{R2Score, Metric};
/// use pronostico::Tensor;
///
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
/// let target = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
///
/// let r2 = R2Score.compute(&pred, &target);
/// assert!((r2 - 1.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct R2Score;

impl Metric for R2Score {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }

        let y_mean: f32 = targets.data().mean().unwrap_or(0.0);
        let ss_res: f32 = paired(predictions, targets)
            .map(|(p, t)| (t - p).powi(2))
            .sum();
        let ss_tot: f32 = targets.data().iter().map(|&t| (t - y_mean).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    fn name(&self) -> &str {
        "r2"
    }

    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Mean Absolute Error
///
/// MAE = mean(|y - y_pred|)
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }

        paired(predictions, targets)
            .map(|(p, t)| (p - t).abs())
            .sum::<f32>()
            / predictions.len() as f32
    }

    fn name(&self) -> &str {
        "mae"
    }
}

/// Root Mean Squared Error
///
/// RMSE = sqrt(mean((y - y_pred)²))
#[derive(Debug, Clone, Copy, Default)]
pub struct RMSE;

impl Metric for RMSE {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        if predictions.is_empty() {
            return 0.0;
        }

        let mse: f32 = paired(predictions, targets)
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f32>()
            / predictions.len() as f32;

        mse.sqrt()
    }

    fn name(&self) -> &str {
        "rmse"
    }
}

/// Caller-supplied metric: an explicit name plus a function of
/// `(targets, predictions)`
///
/// ```
/// use pronostico::train::{Metric, NamedMetric};
/// use pronostico::Tensor;
///
/// let max_err = NamedMetric::new("max_err", |targets, predictions| {
///     targets
///         .data()
///         .iter()
///         .zip(predictions.data().iter())
///         .map(|(t, p)| (t - p).abs())
///         .fold(0.0, f32::max)
/// });
///
/// let pred = Tensor::from_vec(vec![1.0, 4.0], false);
/// let target = Tensor::from_vec(vec![1.5, 2.0], false);
/// assert_eq!(max_err.compute(&pred, &target), 2.0);
/// assert_eq!(max_err.name(), "max_err");
/// ```
pub struct NamedMetric {
    name: String,
    func: Box<dyn Fn(&Tensor, &Tensor) -> f32>,
}

impl NamedMetric {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Tensor, &Tensor) -> f32 + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Metric for NamedMetric {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        (self.func)(targets, predictions)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NamedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedMetric")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Reject metric lists in which two metrics share a display name
pub fn check_unique_names(metrics: &[Box<dyn Metric>]) -> Result<()> {
    let mut seen = HashSet::new();
    for metric in metrics {
        if !seen.insert(metric.name()) {
            return Err(Error::InvalidParameter(format!(
                "duplicate metric name '{}'",
                metric.name()
            )));
        }
    }
    Ok(())
}

/// Running per-batch sums for one evaluation pass
///
/// Every batch counts once regardless of its size, so `means` divides by the
/// number of batches seen.
#[derive(Debug, Default, Clone)]
pub struct MetricAccumulator {
    sums: BTreeMap<String, f32>,
    batches: usize,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch worth of metric values
    pub fn add_batch(
        &mut self,
        metrics: &[Box<dyn Metric>],
        predictions: &Tensor,
        targets: &Tensor,
    ) {
        for metric in metrics {
            let value = metric.compute(predictions, targets);
            *self.sums.entry(metric.name().to_string()).or_insert(0.0) += value;
        }
        self.batches += 1;
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Mean of every metric over the batches seen so far
    pub fn means(&self) -> BTreeMap<String, f32> {
        let n = self.batches.max(1) as f32;
        self.sums
            .iter()
            .map(|(name, sum)| (name.clone(), sum / n))
            .collect()
    }
}
