//! Serialization format definitions

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported model serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFormat {
    /// JSON format (default for `model.json`)
    Json,

    /// YAML format (human-readable, good for configs)
    Yaml,
}

impl ModelFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            ModelFormat::Json => "json",
            ModelFormat::Yaml => "yaml",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ModelFormat::Json),
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Serialization("File has no extension".to_string()))?;

        Self::from_extension(ext)
            .ok_or_else(|| Error::Serialization(format!("Unsupported file extension: {ext}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_round_trip() {
        for format in [ModelFormat::Json, ModelFormat::Yaml] {
            assert_eq!(ModelFormat::from_extension(format.extension()), Some(format));
        }
        assert_eq!(ModelFormat::from_extension("YML"), Some(ModelFormat::Yaml));
        assert_eq!(ModelFormat::from_extension("safetensors"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            ModelFormat::from_path(Path::new("runs/model.json")).unwrap(),
            ModelFormat::Json
        );
        assert!(ModelFormat::from_path(Path::new("model")).is_err());
        assert!(ModelFormat::from_path(Path::new("model.bin")).is_err());
    }
}
