//! Scalar logging for training runs
//!
//! A run logs one scalar per tag per epoch. Tags follow a fixed layout:
//!
//! - `Loss/train`: mean training loss of the epoch
//! - `Loss/test`: mean evaluation loss of the epoch
//! - `metric/<name>`: mean value of each evaluation metric
//!
//! # Example
//!
//! ```
//! use pronostico::monitor::{InMemoryScalars, ScalarSink, TRAIN_LOSS_TAG};
//!
//! let mut sink = InMemoryScalars::new();
//! sink.add_scalar(TRAIN_LOSS_TAG, 0.5, 0).unwrap();
//! sink.add_scalar(TRAIN_LOSS_TAG, 0.4, 1).unwrap();
//!
//! assert_eq!(sink.series(TRAIN_LOSS_TAG), vec![(0, 0.5), (1, 0.4)]);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

mod storage;

pub use storage::{read_scalars, InMemoryScalars, JsonlScalarWriter, ScalarSink, SCALARS_FILE};

#[cfg(test)]
mod tests;

/// Tag of the per-epoch training loss
pub const TRAIN_LOSS_TAG: &str = "Loss/train";

/// Tag of the per-epoch evaluation loss
pub const TEST_LOSS_TAG: &str = "Loss/test";

/// Tag under which an evaluation metric is logged
pub fn metric_tag(name: &str) -> String {
    format!("metric/{name}")
}

/// A single logged scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub tag: String,
    /// Epoch index
    pub step: usize,
    /// Non-finite values are stored as `"NaN"`, `"inf"` or `"-inf"`
    #[serde(with = "scalar_value")]
    pub value: f32,
    /// Unix timestamp in milliseconds
    pub wall_time_ms: u64,
}

impl ScalarRecord {
    /// Create a record stamped with the current time
    pub fn new(tag: impl Into<String>, step: usize, value: f32) -> Self {
        let wall_time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            tag: tag.into(),
            step,
            value,
            wall_time_ms,
        }
    }
}

/// JSON has no literal for non-finite floats, so a diverged loss is written
/// as a string. `null` also reads back as NaN.
mod scalar_value {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(f32::NAN),
            Some(Repr::Number(value)) => Ok(value),
            Some(Repr::Text(text)) => match text.as_str() {
                "NaN" | "nan" => Ok(f32::NAN),
                "inf" | "+inf" => Ok(f32::INFINITY),
                "-inf" => Ok(f32::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid scalar value: {other}"))),
            },
        }
    }
}

/// Remove `dir` and everything in it, then recreate it empty
///
/// A missing directory is not an error.
pub fn prepare_log_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        tracing::debug!(dir = %dir.display(), "clearing log directory");
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
