//! Tensor type with gradient tracking

use super::BackwardOp;
use crate::error::{Error, Result};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared gradient slot of a tensor
pub type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// Tensor with automatic differentiation support
///
/// Data is stored row-major in a flat `Array1<f32>`; `shape` records the
/// logical dimensions. Clones share the gradient cell, so a parameter cloned
/// into the graph receives the gradients computed for it.
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    shape: Vec<usize>,
    grad: GradCell,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a new 1-D tensor with data
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let shape = vec![data.len()];
        Self {
            data,
            shape,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor with an explicit shape
    ///
    /// Fails when the product of `shape` does not match the data length.
    pub fn from_shape_vec(
        shape: impl Into<Vec<usize>>,
        data: Vec<f32>,
        requires_grad: bool,
    ) -> Result<Self> {
        let shape = shape.into();
        let numel: usize = shape.iter().product();
        if numel != data.len() {
            return Err(Error::ShapeMismatch {
                expected: shape,
                got: vec![data.len()],
            });
        }
        let mut tensor = Self::from_vec(data, requires_grad);
        tensor.shape = shape;
        Ok(tensor)
    }

    /// Create a 1-D tensor filled with zeros
    pub fn zeros(size: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(size), requires_grad)
    }

    /// Create a 1-D tensor filled with ones
    pub fn ones(size: usize, requires_grad: bool) -> Self {
        Self::new(Array1::ones(size), requires_grad)
    }

    /// Build an op result with a given shape (callers guarantee the size)
    pub(crate) fn with_shape(data: Array1<f32>, shape: Vec<usize>, requires_grad: bool) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        let mut tensor = Self::new(data, requires_grad);
        tensor.shape = shape;
        tensor
    }

    /// Get reference to data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Get mutable reference to data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Logical dimensions
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get gradient (if computed)
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Set gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Accumulate gradient (for when tensor is used multiple times)
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut grad_ref = self.grad.borrow_mut();
        if let Some(existing) = grad_ref.as_mut() {
            *existing += &grad;
        } else {
            *grad_ref = Some(grad);
        }
    }

    /// Zero out gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Check if requires gradient
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Get reference to gradient cell (for backward operations)
    pub fn grad_cell(&self) -> GradCell {
        self.grad.clone()
    }

    /// Set backward operation
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Get backward operation
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Identity of the underlying graph node, shared by clones
    pub(crate) fn node_id(&self) -> usize {
        Rc::as_ptr(&self.grad) as *const () as usize
    }

    /// A copy of this tensor cut off from the graph
    pub fn detach(&self) -> Tensor {
        Tensor::with_shape(self.data.clone(), self.shape.clone(), false)
    }

    /// Get size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .field("grad", &self.grad.borrow())
            .field("requires_grad", &self.requires_grad)
            .finish()
    }
}
