//! Batch trainer, batch evaluator and epoch driver

use super::metrics::{check_unique_names, MetricAccumulator};
use super::{Batch, History, LossFn, MSELoss, Metric, TrainConfig};
use crate::autograd::{backward, no_grad};
use crate::config::{build_optimizer, save_config, RunSpec, TrainingParams};
use crate::error::{Error, Phase, Result};
use crate::monitor::{
    metric_tag, prepare_log_dir, JsonlScalarWriter, ScalarSink, TEST_LOSS_TAG, TRAIN_LOSS_TAG,
};
use crate::nn::Model;
use crate::optim::{clip_grad_norm, Optimizer};
use crate::Tensor;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File name of the configuration snapshot inside the log directory
pub const SNAPSHOT_FILE: &str = "saved_config.yaml";

/// File name of the persisted parameters inside the log directory
pub const MODEL_FILE: &str = "model.json";

/// Mean loss and metrics of one evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub loss: f32,
    pub metrics: BTreeMap<String, f32>,
}

/// Trained model plus per-epoch history
#[derive(Debug)]
pub struct FitResult<M> {
    pub model: M,
    pub history: History,
}

/// Run one training pass, updating the model in place
///
/// Each batch: clear gradients, predict, compute the loss, back-propagate,
/// optionally clip by global norm, then take one optimizer step.
///
/// Returns the mean batch loss. A pass without batches is an error.
pub fn train_batches<M, I>(
    model: &mut M,
    batches: I,
    optimizer: &mut dyn Optimizer,
    loss_fn: &dyn LossFn,
    max_grad_norm: Option<f32>,
) -> Result<f32>
where
    M: Model + ?Sized,
    I: IntoIterator<Item = Batch>,
{
    let mut total_loss = 0.0;
    let mut num_batches = 0usize;

    for batch in batches {
        optimizer.zero_grad(model.parameters_mut());

        let predictions = model.forward(&batch.inputs)?;
        let mut loss = loss_fn.forward(&predictions, &batch.targets)?;
        let loss_val = scalar_loss(&loss, loss_fn)?;
        if !loss_val.is_finite() {
            tracing::warn!(batch = num_batches, loss = loss_val, "non-finite training loss");
        }

        backward(&mut loss, None);

        if let Some(max_norm) = max_grad_norm {
            let norm = clip_grad_norm(model.parameters_mut(), max_norm);
            if norm > max_norm {
                tracing::debug!(norm, max_norm, "clipped gradients");
            }
        }

        optimizer.step(model.parameters_mut());

        tracing::trace!(batch = num_batches, loss = loss_val, "train step");
        total_loss += loss_val;
        num_batches += 1;
    }

    if num_batches == 0 {
        return Err(Error::EmptyLoader(Phase::Train));
    }

    Ok(total_loss / num_batches as f32)
}

fn scalar_loss(loss: &Tensor, loss_fn: &dyn LossFn) -> Result<f32> {
    loss.data().iter().next().copied().ok_or_else(|| {
        Error::InvalidParameter(format!("loss '{}' returned an empty tensor", loss_fn.name()))
    })
}

/// Run one evaluation pass without gradient tracking
///
/// Loss and every metric are averaged over the number of batches.
pub fn eval_batches<M, I>(
    model: &M,
    batches: I,
    loss_fn: &dyn LossFn,
    metrics: &[Box<dyn Metric>],
) -> Result<EvalReport>
where
    M: Model + ?Sized,
    I: IntoIterator<Item = Batch>,
{
    let _guard = no_grad();

    let mut total_loss = 0.0;
    let mut accumulator = MetricAccumulator::new();

    for batch in batches {
        let predictions = model.forward(&batch.inputs)?;
        let loss = loss_fn.forward(&predictions, &batch.targets)?;
        total_loss += scalar_loss(&loss, loss_fn)?;
        accumulator.add_batch(metrics, &predictions, &batch.targets);
    }

    let num_batches = accumulator.batches();
    if num_batches == 0 {
        return Err(Error::EmptyLoader(Phase::Eval));
    }

    Ok(EvalReport {
        loss: total_loss / num_batches as f32,
        metrics: accumulator.means(),
    })
}

/// Epoch driver: repeated train and eval passes with scalar logging
///
/// # Example
///
/// ```no_run
/// use pronostico::config::OptimSpec;
/// use pronostico::nn::Baseline;
/// use pronostico::train::{Batch, TrainConfig, Trainer, MAE};
/// use pronostico::Tensor;
///
/// let config = TrainConfig::new(5, OptimSpec::new("sgd", 0.1)).with_log_dir("runs/demo");
/// let mut trainer = Trainer::new(config);
/// trainer.add_metric(Box::new(MAE)).unwrap();
///
/// let batches = vec![Batch::new(
///     Tensor::from_shape_vec([2, 1], vec![0.0, 1.0], false).unwrap(),
///     Tensor::from_shape_vec([2, 1], vec![0.0, 1.0], false).unwrap(),
/// )];
///
/// let model = Baseline::new(1, 1, 42).unwrap();
/// let result = trainer.fit(model, || batches.clone(), || batches.clone()).unwrap();
/// println!("final loss: {:?}", result.history.final_train_loss());
/// ```
pub struct Trainer {
    config: TrainConfig,
    loss_fn: Box<dyn LossFn>,
    metrics: Vec<Box<dyn Metric>>,
}

impl Trainer {
    /// Create a trainer with MSE loss and no metrics
    pub fn new(config: TrainConfig) -> Self {
        Self {
            config,
            loss_fn: Box::new(MSELoss),
            metrics: Vec::new(),
        }
    }

    /// Set the loss function
    pub fn set_loss(&mut self, loss_fn: Box<dyn LossFn>) {
        self.loss_fn = loss_fn;
    }

    /// Register an evaluation metric; names must be unique
    pub fn add_metric(&mut self, metric: Box<dyn Metric>) -> Result<()> {
        self.metrics.push(metric);
        if let Err(e) = check_unique_names(&self.metrics) {
            self.metrics.pop();
            return Err(e);
        }
        Ok(())
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn loss_name(&self) -> &str {
        self.loss_fn.name()
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Train for `config.epochs` epochs, logging to `config.log_dir`
    ///
    /// The log directory is cleared first. After the last epoch the scalar
    /// log is flushed, `saved_config.yaml` is written and, if configured, the
    /// trained parameters are saved to `model.json`.
    pub fn fit<M, TF, TI, EF, EI>(&self, model: M, train_fn: TF, eval_fn: EF) -> Result<FitResult<M>>
    where
        M: Model,
        TF: Fn() -> TI,
        TI: IntoIterator<Item = Batch>,
        EF: Fn() -> EI,
        EI: IntoIterator<Item = Batch>,
    {
        let mut model = model;
        let mut optimizer = build_optimizer(&self.config.optimizer)?;

        let log_dir = &self.config.log_dir;
        prepare_log_dir(log_dir)?;
        let mut sink = JsonlScalarWriter::create(log_dir)?;
        tracing::info!(
            log_dir = %log_dir.display(),
            model = model.name(),
            params = model.num_parameters(),
            optimizer = optimizer.name(),
            "starting run"
        );

        let history = self.run_epochs(
            &mut model,
            optimizer.as_mut(),
            &train_fn,
            &eval_fn,
            &mut sink,
        )?;
        sink.flush()?;

        save_config(&self.snapshot(&model), log_dir.join(SNAPSHOT_FILE))?;
        if self.config.save_model {
            crate::io::save_model(&model, log_dir.join(MODEL_FILE))?;
        }

        Ok(FitResult { model, history })
    }

    /// Same loop as [`fit`](Self::fit), logging into `sink` without touching
    /// the filesystem
    pub fn fit_with_sink<M, TF, TI, EF, EI>(
        &self,
        model: M,
        train_fn: TF,
        eval_fn: EF,
        sink: &mut dyn ScalarSink,
    ) -> Result<FitResult<M>>
    where
        M: Model,
        TF: Fn() -> TI,
        TI: IntoIterator<Item = Batch>,
        EF: Fn() -> EI,
        EI: IntoIterator<Item = Batch>,
    {
        let mut model = model;
        let mut optimizer = build_optimizer(&self.config.optimizer)?;

        let history = self.run_epochs(&mut model, optimizer.as_mut(), &train_fn, &eval_fn, sink)?;
        sink.flush()?;

        Ok(FitResult { model, history })
    }

    fn run_epochs<M, TF, TI, EF, EI>(
        &self,
        model: &mut M,
        optimizer: &mut dyn Optimizer,
        train_fn: &TF,
        eval_fn: &EF,
        sink: &mut dyn ScalarSink,
    ) -> Result<History>
    where
        M: Model,
        TF: Fn() -> TI,
        TI: IntoIterator<Item = Batch>,
        EF: Fn() -> EI,
        EI: IntoIterator<Item = Batch>,
    {
        let mut history = History::new();

        for epoch in 0..self.config.epochs {
            let train_loss = train_batches(
                model,
                train_fn(),
                optimizer,
                self.loss_fn.as_ref(),
                self.config.max_grad_norm,
            )?;
            sink.add_scalar(TRAIN_LOSS_TAG, train_loss, epoch)?;

            let report = eval_batches(&*model, eval_fn(), self.loss_fn.as_ref(), &self.metrics)?;
            sink.add_scalar(TEST_LOSS_TAG, report.loss, epoch)?;
            for (name, value) in &report.metrics {
                sink.add_scalar(&metric_tag(name), *value, epoch)?;
            }

            tracing::info!(
                epoch,
                train_loss,
                eval_loss = report.loss,
                "epoch {}/{}",
                epoch + 1,
                self.config.epochs
            );
            history.record_epoch(train_loss, &report);
        }

        Ok(history)
    }

    /// Configuration that produced `model`, as written to `saved_config.yaml`
    pub fn snapshot<M: Model + ?Sized>(&self, model: &M) -> RunSpec {
        RunSpec {
            model: model.spec(),
            optimizer: self.config.optimizer.clone(),
            training: TrainingParams {
                epochs: self.config.epochs,
                log_dir: self.config.log_dir.clone(),
                loss: self.loss_fn.name().to_string(),
                metrics: self.metric_names().into_iter().map(String::from).collect(),
                seed: self.config.seed,
                grad_clip: self.config.max_grad_norm,
                save_model: self.config.save_model,
            },
            data: self.config.data.clone(),
        }
    }

    /// Path of the snapshot written by `fit`
    pub fn snapshot_path(&self) -> PathBuf {
        self.config.log_dir.join(SNAPSHOT_FILE)
    }
}
