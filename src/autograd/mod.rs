//! Tape-based autograd engine
//!
//! Provides automatic differentiation using a computational graph with gradient tape.
//! Every op result keeps a [`BackwardOp`] pointing at its inputs; [`backward`]
//! walks that graph in reverse topological order so each op runs once, after
//! all gradients flowing into its output have been accumulated.

mod backward;
mod context;
mod ops;
mod tensor;


pub use backward::BackwardOp;
pub use context::{is_grad_enabled, no_grad, NoGradGuard};
pub use ops::*;
pub use tensor::{GradCell, Tensor};

use std::collections::HashSet;
use std::rc::Rc;

/// Perform backward pass on a tensor
///
/// Seeds the tensor's gradient with `grad_output` (ones when `None`, the
/// usual case for a scalar loss) and back-propagates through the graph.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    let grad = grad_output.unwrap_or_else(|| ndarray::Array1::ones(tensor.len()));
    tensor.set_grad(grad);

    for op in topological_ops(tensor).iter().rev() {
        op.backward();
    }
}

/// Ops reachable from `root`, producers before consumers
fn topological_ops(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();

    let Some(root_op) = root.backward_op() else {
        return order;
    };

    // (node id, op, children already pushed)
    let mut stack = vec![(root.node_id(), root_op, false)];
    while let Some((id, op, expanded)) = stack.pop() {
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }

        let children: Vec<_> = op
            .inputs()
            .into_iter()
            .filter_map(|input| input.backward_op().map(|child| (input.node_id(), child)))
            .filter(|(child_id, _)| !visited.contains(child_id))
            .collect();

        stack.push((id, op, true));
        for (child_id, child) in children {
            stack.push((child_id, child, false));
        }
    }

    order
}
