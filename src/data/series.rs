//! Seeded synthetic series

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Steps per cycle of the synthetic sine
pub const SINE_PERIOD: f32 = 25.0;

/// Sine wave of `length` points with additive Gaussian noise of standard
/// deviation `noise`
///
/// The same seed always yields the same series.
pub fn sine_series(length: usize, noise: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length)
        .map(|t| {
            let clean = (2.0 * PI * t as f32 / SINE_PERIOD).sin();
            if noise > 0.0 {
                clean + noise * standard_normal(&mut rng)
            } else {
                clean
            }
        })
        .collect()
}

// Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
}
