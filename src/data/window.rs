//! Sliding-window samples over a univariate series

use crate::error::{Error, Result};

/// One (input window, future values) pair
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
}

/// Cut `series` into overlapping windows of `window` observations, each
/// followed by `horizon` target values
///
/// A series shorter than `window + horizon` yields no samples.
pub fn sliding_windows(series: &[f32], window: usize, horizon: usize) -> Result<Vec<Sample>> {
    if window == 0 || horizon == 0 {
        return Err(Error::InvalidParameter(format!(
            "window and horizon must be > 0, got window={window} horizon={horizon}"
        )));
    }

    let span = window + horizon;
    if series.len() < span {
        return Ok(Vec::new());
    }

    Ok(series
        .windows(span)
        .map(|chunk| Sample {
            input: chunk[..window].to_vec(),
            target: chunk[window..].to_vec(),
        })
        .collect())
}

/// Split samples chronologically into (train, eval)
///
/// Both halves keep at least one sample when there are two or more.
pub fn split_samples(mut samples: Vec<Sample>, train_fraction: f32) -> (Vec<Sample>, Vec<Sample>) {
    let n = samples.len();
    if n < 2 {
        return (samples, Vec::new());
    }
    let n_train = ((n as f32 * train_fraction).round() as usize).clamp(1, n - 1);
    let eval = samples.split_off(n_train);
    (samples, eval)
}
