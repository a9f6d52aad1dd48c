//! Model loading functionality

use super::format::ModelFormat;
use super::model::ModelState;
use crate::nn::Model;
use crate::{Error, Result};
use std::path::Path;

/// Load a model saved with [`save_model`](super::save_model)
///
/// The format is detected from the file extension.
///
/// # Example
///
/// ```no_run
/// use pronostico::io::load_model;
///
/// let model = load_model("runs/latest/model.json").unwrap();
/// println!("Loaded {} model", model.name());
/// ```
pub fn load_model(path: impl AsRef<Path>) -> Result<Box<dyn Model>> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    let state: ModelState = match format {
        ModelFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };

    state.restore()
}
