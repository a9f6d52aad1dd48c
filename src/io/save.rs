//! Model saving functionality

use super::format::ModelFormat;
use super::model::ModelState;
use crate::nn::Model;
use crate::{Error, Result};
use std::path::Path;

/// Save a model's architecture and parameters
///
/// The format follows the file extension (`.json`, `.yaml`/`.yml`).
///
/// # Example
///
/// ```no_run
/// use pronostico::io::save_model;
/// use pronostico::nn::Baseline;
///
/// let model = Baseline::new(12, 1, 42).unwrap();
/// save_model(&model, "model.json").unwrap();
/// ```
pub fn save_model<M: Model + ?Sized>(model: &M, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let state = ModelState::capture(model);

    let data = match ModelFormat::from_path(path)? {
        ModelFormat::Json => serde_json::to_string_pretty(&state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        ModelFormat::Yaml => serde_yaml::to_string(&state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };
    std::fs::write(path, data)?;

    tracing::debug!(path = %path.display(), params = model.num_parameters(), "saved model");
    Ok(())
}
