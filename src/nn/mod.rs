//! Sequence-regression models
//!
//! Every model maps a batch-first input tensor to a `[batch, horizon]`
//! prediction and owns its parameters as a flat list of [`Tensor`]s, which is
//! what the optimizers operate on.

mod baseline;
mod recurrent;

pub use baseline::Baseline;
pub use recurrent::Recurrent;

use crate::autograd::{add_bias, matmul};
use crate::config::ModelSpec;
use crate::error::{Error, Result};
use crate::Tensor;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

/// A trainable model with a single prediction operation
pub trait Model {
    /// Predict a `[batch, horizon]` tensor for one input batch
    fn forward(&self, input: &Tensor) -> Result<Tensor>;

    /// Trainable parameters, in a fixed order
    fn parameters(&self) -> &[Tensor];

    /// Mutable access for optimizer updates
    fn parameters_mut(&mut self) -> &mut [Tensor];

    /// Names matching `parameters()` position by position
    fn parameter_names(&self) -> Vec<String>;

    /// Number of predicted values per sample
    fn horizon(&self) -> usize;

    /// Short model name
    fn name(&self) -> &'static str;

    /// Description of this model, as written into run snapshots
    fn spec(&self) -> ModelSpec;

    /// Total number of scalar parameters
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(Tensor::len).sum()
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        (**self).forward(input)
    }

    fn parameters(&self) -> &[Tensor] {
        (**self).parameters()
    }

    fn parameters_mut(&mut self) -> &mut [Tensor] {
        (**self).parameters_mut()
    }

    fn parameter_names(&self) -> Vec<String> {
        (**self).parameter_names()
    }

    fn horizon(&self) -> usize {
        (**self).horizon()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn spec(&self) -> ModelSpec {
        (**self).spec()
    }
}

/// `x @ weight + bias` for `x: [m, k]`, `weight: [k, n]`, `bias: [n]`
pub(crate) fn affine(
    x: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    m: usize,
    k: usize,
    n: usize,
) -> Tensor {
    add_bias(&matmul(x, weight, m, k, n), bias, m, n)
}

/// Parameter drawn from U(-1/√fan, 1/√fan)
pub(crate) fn uniform_param(rng: &mut StdRng, shape: Vec<usize>, fan: usize) -> Result<Tensor> {
    let bound = 1.0 / (fan as f32).sqrt();
    let dist = Uniform::new_inclusive(-bound, bound);
    let numel = shape.iter().product();
    let data = (0..numel).map(|_| dist.sample(rng)).collect();
    Tensor::from_shape_vec(shape, data, true)
}

pub(crate) fn require_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidParameter(format!("{name} must be > 0")));
    }
    Ok(())
}
