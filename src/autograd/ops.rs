//! Autograd operations with backward passes

use super::{is_grad_enabled, BackwardOp, GradCell, Tensor};
use ndarray::{s, Array1};
use std::rc::Rc;

fn tracks_grad(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Add two tensors element-wise
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: operand sizes differ");
    let data = a.data() + b.data();
    let requires_grad = tracks_grad(&[a, b]);

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad.clone());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "mul: operand sizes differ");
    let data = a.data() * b.data();
    let requires_grad = tracks_grad(&[a, b]);

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MulBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MulBackward {
    a: Tensor,
    b: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for MulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * b
                self.a.accumulate_grad(grad * self.b.data());
            }
            if self.b.requires_grad() {
                // ∂L/∂b = ∂L/∂out * a
                self.b.accumulate_grad(grad * self.a.data());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

/// Scale tensor by a scalar
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = a.data() * factor;
    let requires_grad = tracks_grad(&[a]);

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ScaleBackward {
            a: a.clone(),
            factor,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
    result_grad: GradCell,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * self.factor);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// Hyperbolic tangent activation
pub fn tanh(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::tanh);
    let requires_grad = tracks_grad(&[a]);

    let mut result = Tensor::with_shape(data.clone(), a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(TanhBackward {
            a: a.clone(),
            output: data,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct TanhBackward {
    a: Tensor,
    output: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for TanhBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * (1 - tanh²(a))
                let local = self.output.mapv(|y| 1.0 - y * y);
                self.a.accumulate_grad(grad * &local);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// Sum all elements into a one-element tensor
pub fn sum(a: &Tensor) -> Tensor {
    let data = Array1::from(vec![a.data().sum()]);
    let requires_grad = tracks_grad(&[a]);

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SumBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SumBackward {
    a: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂sum * 1 (broadcast)
                self.a
                    .accumulate_grad(Array1::from_elem(self.a.len(), grad[0]));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// Matrix multiplication
///
/// Computes C = A @ B where:
/// - A is m×k (flattened to length m*k)
/// - B is k×n (flattened to length k*n)
/// - C is m×n, returned with shape `[m, n]`
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let a_mat = a
        .data()
        .view()
        .into_shape((m, k))
        .expect("length checked above");
    let b_mat = b
        .data()
        .view()
        .into_shape((k, n))
        .expect("length checked above");
    let c = a_mat.dot(&b_mat);
    let data = Array1::from_iter(c.iter().copied());

    let requires_grad = tracks_grad(&[a, b]);
    let mut result = Tensor::with_shape(data, vec![m, n], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let grad_c = grad_output
                .view()
                .into_shape((self.m, self.n))
                .expect("output gradient matches output shape");

            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C @ B^T
                let b_mat = self
                    .b
                    .data()
                    .view()
                    .into_shape((self.k, self.n))
                    .expect("checked in forward");
                let grad_a = grad_c.dot(&b_mat.t());
                self.a
                    .accumulate_grad(Array1::from_iter(grad_a.iter().copied()));
            }

            if self.b.requires_grad() {
                // ∂L/∂B = A^T @ ∂L/∂C
                let a_mat = self
                    .a
                    .data()
                    .view()
                    .into_shape((self.m, self.k))
                    .expect("checked in forward");
                let grad_b = a_mat.t().dot(&grad_c);
                self.b
                    .accumulate_grad(Array1::from_iter(grad_b.iter().copied()));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

/// Add a bias row to every row of an `[m, n]` matrix
pub fn add_bias(a: &Tensor, bias: &Tensor, m: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * n, "add_bias: matrix size mismatch");
    assert_eq!(bias.len(), n, "add_bias: bias size mismatch");

    let mut data = a.data().clone();
    for row in 0..m {
        let mut slice = data.slice_mut(s![row * n..(row + 1) * n]);
        slice += bias.data();
    }

    let requires_grad = tracks_grad(&[a, bias]);
    let mut result = Tensor::with_shape(data, vec![m, n], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            a: a.clone(),
            bias: bias.clone(),
            m,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    a: Tensor,
    bias: Tensor,
    m: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.bias.requires_grad() {
                // bias gradient sums over rows
                let mut grad_bias = Array1::zeros(self.n);
                for row in 0..self.m {
                    grad_bias += &grad.slice(s![row * self.n..(row + 1) * self.n]);
                }
                self.bias.accumulate_grad(grad_bias);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.bias]
    }
}

/// View the same data under a new shape
pub fn reshape(a: &Tensor, shape: Vec<usize>) -> Tensor {
    assert_eq!(
        shape.iter().product::<usize>(),
        a.len(),
        "reshape: element count must not change"
    );
    let requires_grad = tracks_grad(&[a]);
    let mut result = Tensor::with_shape(a.data().clone(), shape, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReshapeBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReshapeBackward {
    a: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// Take timestep `t` of a batch-first `[batch, steps, features]` tensor
///
/// Returns a `[batch, features]` tensor.
pub fn select_step(x: &Tensor, t: usize) -> Tensor {
    let shape = x.shape();
    assert_eq!(shape.len(), 3, "select_step: expected [batch, steps, features]");
    let (batch, steps, features) = (shape[0], shape[1], shape[2]);
    assert!(t < steps, "select_step: timestep {t} out of range {steps}");

    let mut data = Array1::zeros(batch * features);
    for b in 0..batch {
        let src = (b * steps + t) * features;
        data.slice_mut(s![b * features..(b + 1) * features])
            .assign(&x.data().slice(s![src..src + features]));
    }

    let requires_grad = tracks_grad(&[x]);
    let mut result = Tensor::with_shape(data, vec![batch, features], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SelectStepBackward {
            x: x.clone(),
            t,
            batch,
            steps,
            features,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SelectStepBackward {
    x: Tensor,
    t: usize,
    batch: usize,
    steps: usize,
    features: usize,
    result_grad: GradCell,
}

impl BackwardOp for SelectStepBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                // scatter back into the selected timestep, zeros elsewhere
                let mut grad_x = Array1::zeros(self.x.len());
                for b in 0..self.batch {
                    let dst = (b * self.steps + self.t) * self.features;
                    grad_x
                        .slice_mut(s![dst..dst + self.features])
                        .assign(&grad.slice(s![b * self.features..(b + 1) * self.features]));
                }
                self.x.accumulate_grad(grad_x);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x]
    }
}
