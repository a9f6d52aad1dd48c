//! Flatten + linear baseline

use super::{affine, require_positive, uniform_param, Model};
use crate::autograd::reshape;
use crate::config::ModelSpec;
use crate::error::{Error, Result};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Flattens every non-batch dimension and applies one affine map
///
/// `[B, d1, d2, ...] -> [B, d1*d2*...] -> [B, horizon]`, where the flattened
/// width must equal `observations`.
pub struct Baseline {
    observations: usize,
    horizon: usize,
    // [weight [observations, horizon], bias [horizon]]
    params: Vec<Tensor>,
}

impl Baseline {
    /// Create a baseline with seeded uniform initialization
    pub fn new(observations: usize, horizon: usize, seed: u64) -> Result<Self> {
        require_positive("observations", observations)?;
        require_positive("horizon", horizon)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let weight = uniform_param(&mut rng, vec![observations, horizon], observations)?;
        let bias = uniform_param(&mut rng, vec![horizon], observations)?;

        Ok(Self {
            observations,
            horizon,
            params: vec![weight, bias],
        })
    }

    pub fn observations(&self) -> usize {
        self.observations
    }
}

impl Model for Baseline {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let shape = input.shape();
        let (batch, features) = match shape {
            [batch, rest @ ..] if !rest.is_empty() => (*batch, rest.iter().product::<usize>()),
            _ => (0, 0),
        };
        if features != self.observations {
            return Err(Error::ShapeMismatch {
                expected: vec![batch, self.observations],
                got: shape.to_vec(),
            });
        }

        let flat = reshape(input, vec![batch, self.observations]);
        Ok(affine(
            &flat,
            &self.params[0],
            &self.params[1],
            batch,
            self.observations,
            self.horizon,
        ))
    }

    fn parameters(&self) -> &[Tensor] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }

    fn parameter_names(&self) -> Vec<String> {
        vec!["linear.weight".to_string(), "linear.bias".to_string()]
    }

    fn horizon(&self) -> usize {
        self.horizon
    }

    fn name(&self) -> &'static str {
        "baseline"
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::Baseline {
            observations: self.observations,
            horizon: self.horizon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_shape_flattens_trailing_dims() {
        let model = Baseline::new(6, 2, 0).unwrap();
        let input = Tensor::from_shape_vec([4, 3, 2], vec![0.5; 24], false).unwrap();

        let out = model.forward(&input).unwrap();
        assert_eq!(out.shape(), &[4, 2]);
    }

    #[test]
    fn test_forward_is_affine() {
        let mut model = Baseline::new(2, 1, 0).unwrap();
        *model.parameters_mut()[0].data_mut() = ndarray::arr1(&[2.0, -1.0]);
        *model.parameters_mut()[1].data_mut() = ndarray::arr1(&[0.5]);

        let input = Tensor::from_shape_vec([2, 2], vec![1.0, 1.0, 3.0, 2.0], false).unwrap();
        let out = model.forward(&input).unwrap();

        assert_abs_diff_eq!(out.data()[0], 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out.data()[1], 4.5, epsilon = 1e-6);
    }

    #[test]
    fn test_wrong_width_is_shape_mismatch() {
        let model = Baseline::new(5, 1, 0).unwrap();
        let input = Tensor::from_shape_vec([2, 4], vec![0.0; 8], false).unwrap();

        let err = model.forward(&input).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_rank_one_input_rejected() {
        let model = Baseline::new(3, 1, 0).unwrap();
        let input = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);

        assert!(model.forward(&input).is_err());
    }

    #[test]
    fn test_same_seed_same_init() {
        let a = Baseline::new(4, 2, 7).unwrap();
        let b = Baseline::new(4, 2, 7).unwrap();
        let c = Baseline::new(4, 2, 8).unwrap();

        assert_eq!(a.parameters()[0].data(), b.parameters()[0].data());
        assert_ne!(a.parameters()[0].data(), c.parameters()[0].data());
    }

    #[test]
    fn test_init_within_fan_bound() {
        let model = Baseline::new(16, 3, 1).unwrap();
        let bound = 1.0 / 4.0;
        for p in model.parameters() {
            assert!(p.data().iter().all(|v| v.abs() <= bound));
        }
    }

    #[test]
    fn test_gradients_reach_parameters() {
        let model = Baseline::new(3, 2, 0).unwrap();
        let input = Tensor::from_shape_vec([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false)
            .unwrap();

        let mut loss = sum(&model.forward(&input).unwrap());
        backward(&mut loss, None);

        // d(sum)/d(bias) = batch size per output
        let grad_bias = model.parameters()[1].grad().unwrap();
        assert_abs_diff_eq!(grad_bias[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad_bias[1], 2.0, epsilon = 1e-6);

        // d(sum)/d(w[i, j]) = Σ_b x[b, i]
        let grad_w = model.parameters()[0].grad().unwrap();
        assert_abs_diff_eq!(grad_w[0], 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad_w[5], 9.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(Baseline::new(0, 1, 0).is_err());
        assert!(Baseline::new(1, 0, 0).is_err());
    }
}
