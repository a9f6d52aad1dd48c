//! In-memory batch loader

use super::window::Sample;
use crate::error::{Error, Result};
use crate::train::Batch;
use crate::Tensor;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;

/// How a window is laid out in the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[batch, window]`, consumed by the baseline
    Flat,
    /// `[batch, window, 1]`, consumed by the recurrent model
    Sequence,
}

/// Groups samples into batches, optionally reshuffling on every pass
///
/// Each call to [`BatchLoader::batches`] is one pass over the data. With
/// shuffling enabled the order differs between passes but the whole sequence
/// of passes is fixed by the seed.
#[derive(Debug)]
pub struct BatchLoader {
    samples: Vec<Sample>,
    batch_size: usize,
    layout: InputLayout,
    window: usize,
    horizon: usize,
    rng: Option<RefCell<StdRng>>,
}

impl BatchLoader {
    /// Create a loader that yields samples in their original order
    ///
    /// All samples must share the input and target lengths of the first.
    pub fn new(samples: Vec<Sample>, batch_size: usize, layout: InputLayout) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter("batch_size must be > 0".into()));
        }
        let (window, horizon) = samples
            .first()
            .map_or((0, 0), |s| (s.input.len(), s.target.len()));
        if let Some(bad) = samples
            .iter()
            .find(|s| s.input.len() != window || s.target.len() != horizon)
        {
            return Err(Error::ShapeMismatch {
                expected: vec![window, horizon],
                got: vec![bad.input.len(), bad.target.len()],
            });
        }

        Ok(Self {
            samples,
            batch_size,
            layout,
            window,
            horizon,
            rng: None,
        })
    }

    /// Reshuffle before every pass using a generator seeded with `seed`
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.rng = Some(RefCell::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Number of batches per pass (the last one may be short)
    pub fn len(&self) -> usize {
        (self.samples.len() + self.batch_size - 1) / self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One pass over the data
    pub fn batches(&self) -> Vec<Batch> {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        if let Some(rng) = &self.rng {
            order.shuffle(&mut *rng.borrow_mut());
        }

        order
            .chunks(self.batch_size)
            .map(|chunk| self.collate(chunk))
            .collect()
    }

    fn collate(&self, indices: &[usize]) -> Batch {
        let rows = indices.len();
        let mut inputs = Vec::with_capacity(rows * self.window);
        let mut targets = Vec::with_capacity(rows * self.horizon);
        for &i in indices {
            inputs.extend_from_slice(&self.samples[i].input);
            targets.extend_from_slice(&self.samples[i].target);
        }

        let input_shape = match self.layout {
            InputLayout::Flat => vec![rows, self.window],
            InputLayout::Sequence => vec![rows, self.window, 1],
        };
        Batch::new(
            Tensor::with_shape(Array1::from(inputs), input_shape, false),
            Tensor::with_shape(Array1::from(targets), vec![rows, self.horizon], false),
        )
    }
}

impl IntoIterator for &BatchLoader {
    type Item = Batch;
    type IntoIter = std::vec::IntoIter<Batch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sliding_windows;

    fn samples(n: usize) -> Vec<Sample> {
        let series: Vec<f32> = (0..n + 2).map(|i| i as f32).collect();
        sliding_windows(&series, 2, 1).unwrap()
    }

    #[test]
    fn test_batches_in_order() {
        let loader = BatchLoader::new(samples(5), 2, InputLayout::Flat).unwrap();
        assert_eq!(loader.len(), 3);

        let batches = loader.batches();
        let sizes: Vec<usize> = batches.iter().map(Batch::size).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(batches[0].inputs.shape(), &[2, 2]);
        assert_eq!(batches[0].inputs.data().to_vec(), vec![0.0, 1.0, 1.0, 2.0]);
        assert_eq!(batches[0].targets.shape(), &[2, 1]);
        assert_eq!(batches[2].targets.data().to_vec(), vec![6.0]);
    }

    #[test]
    fn test_sequence_layout() {
        let loader = BatchLoader::new(samples(3), 3, InputLayout::Sequence).unwrap();
        let batches: Vec<Batch> = (&loader).into_iter().collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].inputs.shape(), &[3, 2, 1]);
    }

    #[test]
    fn test_shuffle_is_seeded_and_varies_between_passes() {
        let passes = |loader: &BatchLoader| -> Vec<Vec<f32>> {
            (0..3)
                .map(|_| {
                    loader
                        .batches()
                        .iter()
                        .flat_map(|b| b.targets.data().to_vec())
                        .collect()
                })
                .collect()
        };

        let a = BatchLoader::new(samples(20), 4, InputLayout::Flat)
            .unwrap()
            .with_shuffle(9);
        let b = BatchLoader::new(samples(20), 4, InputLayout::Flat)
            .unwrap()
            .with_shuffle(9);
        let passes_a = passes(&a);
        assert_eq!(passes_a, passes(&b));
        assert_ne!(passes_a[0], passes_a[1]);

        let mut sorted = passes_a[0].clone();
        sorted.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (2..22).map(|i| i as f32).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_rejects_zero_batch_size_and_ragged_samples() {
        assert!(BatchLoader::new(samples(2), 0, InputLayout::Flat).is_err());

        let mut ragged = samples(2);
        ragged[1].input.push(0.0);
        assert!(matches!(
            BatchLoader::new(ragged, 1, InputLayout::Flat),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_loader_yields_no_batches() {
        let loader = BatchLoader::new(Vec::new(), 4, InputLayout::Flat).unwrap();
        assert!(loader.is_empty());
        assert!(loader.batches().is_empty());
    }
}
