//! Loss functions for training

use crate::autograd::{is_grad_enabled, BackwardOp, GradCell};
use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Array1;
use std::rc::Rc;

/// Trait for loss functions
pub trait LossFn {
    /// Compute a scalar loss for predictions against targets
    ///
    /// The returned tensor holds one value and, when predictions track
    /// gradients, back-propagates into them.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor>;

    /// Name of the loss function
    fn name(&self) -> &str;
}

fn check_lengths(predictions: &Tensor, targets: &Tensor) -> Result<()> {
    if predictions.len() != targets.len() {
        return Err(Error::ShapeMismatch {
            expected: predictions.shape().to_vec(),
            got: targets.shape().to_vec(),
        });
    }
    if predictions.is_empty() {
        return Err(Error::InvalidParameter(
            "loss over an empty batch".to_string(),
        ));
    }
    Ok(())
}

/// Scalar loss tensor whose backward adds a fixed gradient into `predictions`
fn scalar_loss(value: f32, predictions: &Tensor, grad: impl FnOnce() -> Array1<f32>) -> Tensor {
    let tracks = is_grad_enabled() && predictions.requires_grad();
    let mut loss = Tensor::from_vec(vec![value], tracks);

    if tracks {
        loss.set_backward_op(Rc::new(PointwiseLossBackward {
            predictions: predictions.clone(),
            local_grad: grad(),
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

struct PointwiseLossBackward {
    predictions: Tensor,
    local_grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for PointwiseLossBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.local_grad * grad[0]);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.predictions]
    }
}

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²)
///
/// # Example
///
/// ```
/// use pronostico::train::{MSELoss, LossFn};
/// use pronostico::Tensor;
///
/// let loss_fn = MSELoss;
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = loss_fn.forward(&pred, &target).unwrap();
/// assert!((loss.data()[0] - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        check_lengths(predictions, targets)?;

        let diff = predictions.data() - targets.data();
        let n = predictions.len() as f32;
        let mse = diff.iter().map(|d| d * d).sum::<f32>() / n;

        // d(MSE)/d(pred) = 2 * (pred - target) / n
        Ok(scalar_loss(mse, predictions, || diff * (2.0 / n)))
    }

    fn name(&self) -> &str {
        "mse"
    }
}

/// Mean Absolute Error Loss
///
/// L = mean(|predictions - targets|), with subgradient 0 where they agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct L1Loss;

impl LossFn for L1Loss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Result<Tensor> {
        check_lengths(predictions, targets)?;

        let diff = predictions.data() - targets.data();
        let n = predictions.len() as f32;
        let mae = diff.iter().map(|d| d.abs()).sum::<f32>() / n;

        Ok(scalar_loss(mae, predictions, || {
            diff.mapv(|d| {
                if d > 0.0 {
                    1.0 / n
                } else if d < 0.0 {
                    -1.0 / n
                } else {
                    0.0
                }
            })
        }))
    }

    fn name(&self) -> &str {
        "l1"
    }
}
