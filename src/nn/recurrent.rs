//! Stacked Elman RNN with a linear head on the last timestep

use super::{affine, require_positive, uniform_param, Model};
use crate::autograd::{add, select_step, tanh};
use crate::config::ModelSpec;
use crate::error::{Error, Result};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Parameters per recurrent layer: w_ih, w_hh, b_ih, b_hh
const PARAMS_PER_LAYER: usize = 4;

/// Recurrent regressor
///
/// Each layer computes `h_t = tanh(x_t W_ih + b_ih + h_{t-1} W_hh + b_hh)`
/// with `h_0 = 0`. Input is batch-first `[batch, steps, input_size]`; only the
/// top layer's final hidden state feeds the `[hidden_size, horizon]` head.
pub struct Recurrent {
    input_size: usize,
    hidden_size: usize,
    num_layers: usize,
    horizon: usize,
    // layer k at 4k..4k+4, then head weight and bias
    params: Vec<Tensor>,
}

impl Recurrent {
    /// Create a recurrent model with seeded uniform initialization
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        horizon: usize,
        seed: u64,
    ) -> Result<Self> {
        require_positive("input_size", input_size)?;
        require_positive("hidden_size", hidden_size)?;
        require_positive("num_layers", num_layers)?;
        require_positive("horizon", horizon)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut params = Vec::with_capacity(num_layers * PARAMS_PER_LAYER + 2);

        for layer in 0..num_layers {
            let layer_in = if layer == 0 { input_size } else { hidden_size };
            params.push(uniform_param(&mut rng, vec![layer_in, hidden_size], hidden_size)?);
            params.push(uniform_param(&mut rng, vec![hidden_size, hidden_size], hidden_size)?);
            params.push(uniform_param(&mut rng, vec![hidden_size], hidden_size)?);
            params.push(uniform_param(&mut rng, vec![hidden_size], hidden_size)?);
        }
        params.push(uniform_param(&mut rng, vec![hidden_size, horizon], hidden_size)?);
        params.push(uniform_param(&mut rng, vec![horizon], hidden_size)?);

        Ok(Self {
            input_size,
            hidden_size,
            num_layers,
            horizon,
            params,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Run one layer over a sequence of `[batch, layer_in]` steps
    fn run_layer(&self, layer: usize, steps: &[Tensor], batch: usize) -> Result<Vec<Tensor>> {
        let base = layer * PARAMS_PER_LAYER;
        let (w_ih, w_hh) = (&self.params[base], &self.params[base + 1]);
        let (b_ih, b_hh) = (&self.params[base + 2], &self.params[base + 3]);
        let layer_in = if layer == 0 {
            self.input_size
        } else {
            self.hidden_size
        };
        let hidden = self.hidden_size;

        let mut h = Tensor::from_shape_vec(vec![batch, hidden], vec![0.0; batch * hidden], false)?;
        let mut outputs = Vec::with_capacity(steps.len());

        for x_t in steps {
            let from_input = affine(x_t, w_ih, b_ih, batch, layer_in, hidden);
            let from_state = affine(&h, w_hh, b_hh, batch, hidden, hidden);
            h = tanh(&add(&from_input, &from_state));
            outputs.push(h.clone());
        }

        Ok(outputs)
    }
}

impl Model for Recurrent {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let (batch, steps) = match input.shape() {
            &[batch, steps, features] if features == self.input_size && steps > 0 => {
                (batch, steps)
            }
            shape => {
                return Err(Error::ShapeMismatch {
                    expected: vec![shape.first().copied().unwrap_or(0), 0, self.input_size],
                    got: shape.to_vec(),
                })
            }
        };

        let mut sequence: Vec<Tensor> = (0..steps).map(|t| select_step(input, t)).collect();
        for layer in 0..self.num_layers {
            sequence = self.run_layer(layer, &sequence, batch)?;
        }

        let last = &sequence[steps - 1];
        let head = self.num_layers * PARAMS_PER_LAYER;
        Ok(affine(
            last,
            &self.params[head],
            &self.params[head + 1],
            batch,
            self.hidden_size,
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
        let mut names = Vec::with_capacity(self.params.len());
        for layer in 0..self.num_layers {
            for suffix in ["w_ih", "w_hh", "b_ih", "b_hh"] {
                names.push(format!("rnn.{layer}.{suffix}"));
            }
        }
        names.push("head.weight".to_string());
        names.push("head.bias".to_string());
        names
    }

    fn horizon(&self) -> usize {
        self.horizon
    }

    fn name(&self) -> &'static str {
        "recurrent"
    }

    fn spec(&self) -> ModelSpec {
        ModelSpec::Recurrent {
            input_size: self.input_size,
            hidden_size: self.hidden_size,
            num_layers: self.num_layers,
            horizon: self.horizon,
        }
    }
}
