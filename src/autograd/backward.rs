//! Backward operation trait

use super::Tensor;

/// Trait for backward pass operations
///
/// `backward` propagates the gradient of the op's output one level down into
/// its inputs. Traversal of the graph is done by [`crate::autograd::backward`],
/// which calls every op exactly once, after all of its consumers.
pub trait BackwardOp {
    /// Propagate the output gradient into the inputs
    fn backward(&self);

    /// Tensors this op read to produce its output
    fn inputs(&self) -> Vec<&Tensor>;
}
