//! Serializable model state

use crate::config::{build_model, ModelSpec};
use crate::nn::Model;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Information about a model parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g., "rnn.0.w_ih", "head.bias")
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,
}

/// Serializable model state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Architecture the parameters belong to
    pub spec: ModelSpec,

    /// Parameter information, in model order
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

impl ModelState {
    /// Capture the current parameters of a model
    pub fn capture<M: Model + ?Sized>(model: &M) -> Self {
        let mut data = Vec::with_capacity(model.num_parameters());
        let parameters = model
            .parameter_names()
            .into_iter()
            .zip(model.parameters())
            .map(|(name, tensor)| {
                data.extend(tensor.data().iter().copied());
                ParameterInfo {
                    name,
                    shape: tensor.shape().to_vec(),
                }
            })
            .collect();

        Self {
            spec: model.spec(),
            parameters,
            data,
        }
    }

    /// Rebuild the model and copy the stored parameters into it
    pub fn restore(&self) -> Result<Box<dyn Model>> {
        let mut model = build_model(&self.spec, 0)?;

        if model.parameters().len() != self.parameters.len() {
            return Err(Error::Serialization(format!(
                "{} model has {} parameters, state has {}",
                self.spec.kind(),
                model.parameters().len(),
                self.parameters.len()
            )));
        }

        let mut offset = 0;
        for (param, info) in model.parameters_mut().iter_mut().zip(&self.parameters) {
            if param.shape() != info.shape.as_slice() {
                return Err(Error::ShapeMismatch {
                    expected: param.shape().to_vec(),
                    got: info.shape.clone(),
                });
            }
            let size = param.len();
            let chunk = self.data.get(offset..offset + size).ok_or_else(|| {
                Error::Serialization(format!("parameter data truncated at '{}'", info.name))
            })?;
            param.data_mut().assign(&ndarray::ArrayView1::from(chunk));
            offset += size;
        }

        if offset != self.data.len() {
            return Err(Error::Serialization(format!(
                "{} trailing values after the last parameter",
                self.data.len() - offset
            )));
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::{Baseline, Recurrent};
    use crate::Tensor;

    #[test]
    fn test_capture_records_names_and_shapes() {
        let model = Baseline::new(3, 2, 0).unwrap();
        let state = ModelState::capture(&model);

        assert_eq!(state.parameters[0].name, "linear.weight");
        assert_eq!(state.parameters[0].shape, vec![3, 2]);
        assert_eq!(state.parameters[1].shape, vec![2]);
        assert_eq!(state.data.len(), 8);
    }

    #[test]
    fn test_restore_reproduces_predictions() {
        let model = Recurrent::new(1, 4, 2, 1, 9).unwrap();
        let restored = ModelState::capture(&model).restore().unwrap();

        let input = Tensor::from_shape_vec([2, 3, 1], vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], false)
            .unwrap();
        assert_eq!(
            model.forward(&input).unwrap().data(),
            restored.forward(&input).unwrap().data()
        );
    }

    #[test]
    fn test_restore_rejects_truncated_data() {
        let model = Baseline::new(3, 1, 0).unwrap();
        let mut state = ModelState::capture(&model);
        state.data.pop();

        assert!(state.restore().is_err());
    }

    #[test]
    fn test_restore_rejects_wrong_shapes() {
        let model = Baseline::new(3, 1, 0).unwrap();
        let mut state = ModelState::capture(&model);
        state.parameters[0].shape = vec![1, 3];

        assert!(matches!(state.restore(), Err(Error::ShapeMismatch { .. })));
    }
}
