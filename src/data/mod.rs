//! In-memory data collaborators
//!
//! A univariate series is cut into sliding windows, split chronologically
//! into train and eval samples, and grouped into [`Batch`](crate::train::Batch)es
//! by a [`BatchLoader`]:
//!
//! ```
//! use pronostico::data::{sine_series, sliding_windows, split_samples, BatchLoader, InputLayout};
//!
//! let series = sine_series(100, 0.05, 42);
//! let samples = sliding_windows(&series, 12, 1)?;
//! let (train, eval) = split_samples(samples, 0.8);
//!
//! let train = BatchLoader::new(train, 16, InputLayout::Sequence)?.with_shuffle(42);
//! let eval = BatchLoader::new(eval, 16, InputLayout::Sequence)?;
//! assert_eq!(train.num_samples() + eval.num_samples(), 88);
//! # Ok::<(), pronostico::Error>(())
//! ```

mod loader;
mod series;
mod window;

pub use loader::{BatchLoader, InputLayout};
pub use series::{sine_series, SINE_PERIOD};
pub use window::{sliding_windows, split_samples, Sample};
