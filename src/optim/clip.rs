//! Gradient clipping

use crate::Tensor;

/// Clip gradients by global norm
///
/// global_norm = sqrt(Σ ‖g_i‖²); when it exceeds `max_norm` every gradient is
/// scaled by `max_norm / global_norm`. Returns the norm measured before clipping.
pub fn clip_grad_norm(params: &mut [Tensor], max_norm: f32) -> f32 {
    let total_norm_sq: f32 = params
        .iter()
        .filter_map(Tensor::grad)
        .map(|grad| grad.iter().map(|&g| g * g).sum::<f32>())
        .sum();

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * clip_coef);
            }
        }
    }

    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_clip_scales_to_max_norm() {
        let mut params = vec![
            Tensor::from_vec(vec![0.0, 0.0], true),
            Tensor::from_vec(vec![0.0], true),
        ];
        params[0].set_grad(ndarray::arr1(&[3.0, 0.0]));
        params[1].set_grad(ndarray::arr1(&[4.0]));

        let norm = clip_grad_norm(&mut params, 1.0);

        assert_abs_diff_eq!(norm, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(params[0].grad().unwrap()[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(params[1].grad().unwrap()[0], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_leaves_small_gradients() {
        let mut params = vec![Tensor::from_vec(vec![0.0], true)];
        params[0].set_grad(ndarray::arr1(&[0.5]));

        let norm = clip_grad_norm(&mut params, 1.0);

        assert_abs_diff_eq!(norm, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(params[0].grad().unwrap()[0], 0.5, epsilon = 1e-6);
    }
}
