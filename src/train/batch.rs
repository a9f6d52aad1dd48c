//! Training batch

use crate::Tensor;

/// One unit of (input, target) tensors processed in a single step
///
/// Inputs are batch-first; targets are `[batch, horizon]`.
#[derive(Clone, Debug)]
pub struct Batch {
    pub inputs: Tensor,
    pub targets: Tensor,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of samples (leading dimension of the inputs)
    pub fn size(&self) -> usize {
        self.inputs.shape().first().copied().unwrap_or(0)
    }
}
