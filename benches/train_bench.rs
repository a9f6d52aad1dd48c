//! Performance benchmarks for the training loop.
//!
//! Measures forward cost per model and the overhead of one train pass.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pronostico::data::{sine_series, sliding_windows, BatchLoader, InputLayout};
use pronostico::monitor::InMemoryScalars;
use pronostico::nn::{Baseline, Model, Recurrent};
use pronostico::optim::Adam;
use pronostico::train::{train_batches, MSELoss};
use pronostico::{no_grad, Tensor};

fn sequence_input(batch: usize, steps: usize) -> Tensor {
    let data: Vec<f32> = (0..batch * steps).map(|i| (i as f32 * 0.1).sin()).collect();
    Tensor::from_shape_vec([batch, steps, 1], data, false).unwrap()
}

/// Benchmark Recurrent::forward over sequence length
fn bench_recurrent_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recurrent::forward");
    let model = Recurrent::new(1, 32, 2, 1, 0).unwrap();

    for steps in [8, 32, 128].iter() {
        let input = sequence_input(32, *steps);
        group.throughput(Throughput::Elements(*steps as u64));
        group.bench_with_input(BenchmarkId::new("no_grad", steps), &input, |b, input| {
            b.iter(|| {
                let _guard = no_grad();
                black_box(model.forward(input).unwrap())
            });
        });
        group.bench_with_input(BenchmarkId::new("tracked", steps), &input, |b, input| {
            b.iter(|| black_box(model.forward(input).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark one training pass over a synthetic series
fn bench_train_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("train_batches");
    let series = sine_series(1_000, 0.05, 0);
    let samples = sliding_windows(&series, 16, 1).unwrap();

    let flat = BatchLoader::new(samples.clone(), 64, InputLayout::Flat).unwrap();
    group.bench_function("baseline", |b| {
        let mut model = Baseline::new(16, 1, 0).unwrap();
        let mut optimizer = Adam::default_params(1e-3);
        b.iter(|| {
            black_box(train_batches(&mut model, flat.batches(), &mut optimizer, &MSELoss, None).unwrap())
        });
    });

    let sequence = BatchLoader::new(samples, 64, InputLayout::Sequence).unwrap();
    group.bench_function("recurrent", |b| {
        let mut model = Recurrent::new(1, 16, 1, 1, 0).unwrap();
        let mut optimizer = Adam::default_params(1e-3);
        b.iter(|| {
            black_box(
                train_batches(&mut model, sequence.batches(), &mut optimizer, &MSELoss, Some(1.0))
                    .unwrap(),
            )
        });
    });
    group.finish();
}

/// Benchmark scalar logging into memory
fn bench_scalar_sink(c: &mut Criterion) {
    use pronostico::monitor::ScalarSink;

    c.bench_function("InMemoryScalars::add_scalar", |b| {
        b.iter(|| {
            let mut sink = InMemoryScalars::new();
            for step in 0..1_000 {
                sink.add_scalar("Loss/train", 1.0 / (step as f32 + 1.0), step)
                    .unwrap();
            }
            black_box(sink)
        });
    });
}

criterion_group!(
    benches,
    bench_recurrent_forward,
    bench_train_pass,
    bench_scalar_sink
);
criterion_main!(benches);
