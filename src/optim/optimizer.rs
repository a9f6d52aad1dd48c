//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// An optimizer is bound to one parameter list: per-parameter state
/// (momentum, moments) is indexed by position in the slice passed to `step`.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [Tensor]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Short name used in logs and config snapshots
    fn name(&self) -> &'static str;
}
