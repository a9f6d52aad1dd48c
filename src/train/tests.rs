//! Training loop contract tests

use super::*;
use crate::config::OptimSpec;
use crate::monitor::InMemoryScalars;
use crate::nn::{Baseline, Model, Recurrent};
use crate::optim::SGD;
use crate::Tensor;
use proptest::prelude::*;

fn column(values: &[f32]) -> Tensor {
    Tensor::from_shape_vec([values.len(), 1], values.to_vec(), false).unwrap()
}

fn identity_batch() -> Batch {
    let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
    Batch::new(column(&xs), column(&xs))
}

fn batch_loss<M: Model>(model: &M, batch: &Batch) -> f32 {
    let predictions = model.forward(&batch.inputs).unwrap();
    MSELoss.forward(&predictions, &batch.targets).unwrap().data()[0]
}

#[test]
fn test_single_batch_loss_matches_recomputation() {
    let mut model = Baseline::new(1, 1, 42).unwrap();
    let batch = identity_batch();
    let expected = batch_loss(&model, &batch);

    let mut frozen = SGD::new(0.0, 0.0);
    let reported = train_batches(&mut model, vec![batch.clone()], &mut frozen, &MSELoss, None)
        .unwrap();

    assert_eq!(reported, expected);
    assert_eq!(batch_loss(&model, &batch), expected);
}

#[test]
fn test_baseline_loss_strictly_decreases() {
    let config = TrainConfig::new(5, OptimSpec::new("sgd", 0.1));
    let trainer = Trainer::new(config);
    let mut sink = InMemoryScalars::new();

    let result = trainer
        .fit_with_sink(
            Baseline::new(1, 1, 42).unwrap(),
            || vec![identity_batch()],
            || vec![identity_batch()],
            &mut sink,
        )
        .unwrap();

    let losses = &result.history.train_losses;
    assert_eq!(losses.len(), 5);
    for pair in losses.windows(2) {
        assert!(pair[1] < pair[0], "loss did not decrease: {:?}", losses);
    }
}

#[test]
fn test_eval_is_deterministic_for_frozen_model() {
    let model = Recurrent::new(1, 4, 2, 1, 3).unwrap();
    let batches = || {
        vec![
            Batch::new(
                Tensor::from_shape_vec([2, 3, 1], vec![0.1, 0.2, 0.3, 0.2, 0.3, 0.4], false)
                    .unwrap(),
                column(&[0.4, 0.5]),
            ),
            Batch::new(
                Tensor::from_shape_vec([1, 3, 1], vec![0.5, 0.6, 0.7], false).unwrap(),
                column(&[0.8]),
            ),
        ]
    };
    let metrics: Vec<Box<dyn Metric>> = vec![Box::new(MAE), Box::new(RMSE), Box::new(R2Score)];

    let first = eval_batches(&model, batches(), &MSELoss, &metrics).unwrap();
    let second = eval_batches(&model, batches(), &MSELoss, &metrics).unwrap();

    assert_eq!(first, second);
    for (name, value) in &first.metrics {
        assert_eq!(value.to_bits(), second.metrics[name].to_bits());
    }
}

#[test]
fn test_empty_eval_loader_aborts_fit() {
    let trainer = Trainer::new(TrainConfig::new(2, OptimSpec::new("sgd", 0.1)));
    let mut sink = InMemoryScalars::new();

    let result = trainer.fit_with_sink(
        Baseline::new(1, 1, 0).unwrap(),
        || vec![identity_batch()],
        Vec::<Batch>::new,
        &mut sink,
    );

    assert!(matches!(
        result,
        Err(crate::Error::EmptyLoader(crate::error::Phase::Eval))
    ));
    // the train loss of the first epoch was already logged
    assert_eq!(sink.count("Loss/train"), 1);
    assert_eq!(sink.count("Loss/test"), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_train_loss_is_exact_batch_mean(
        batches in prop::collection::vec(
            prop::collection::vec((-2.0f32..2.0, -2.0f32..2.0), 1..6),
            1..6,
        )
    ) {
        let batches: Vec<Batch> = batches
            .into_iter()
            .map(|pairs| {
                let (xs, ys): (Vec<f32>, Vec<f32>) = pairs.into_iter().unzip();
                Batch::new(column(&xs), column(&ys))
            })
            .collect();

        let mut model = Baseline::new(1, 1, 7).unwrap();
        let mut expected = 0.0f32;
        for batch in &batches {
            expected += batch_loss(&model, batch);
        }
        expected /= batches.len() as f32;

        let mut frozen = SGD::new(0.0, 0.0);
        let reported = train_batches(&mut model, batches, &mut frozen, &MSELoss, None).unwrap();

        prop_assert_eq!(reported, expected);
    }

    #[test]
    fn prop_sink_receives_one_entry_per_epoch(epochs in 1usize..6) {
        let trainer = Trainer::new(TrainConfig::new(epochs, OptimSpec::new("sgd", 0.01)));
        let mut sink = InMemoryScalars::new();

        trainer
            .fit_with_sink(
                Baseline::new(1, 1, 0).unwrap(),
                || vec![identity_batch()],
                || vec![identity_batch()],
                &mut sink,
            )
            .unwrap();

        prop_assert_eq!(sink.count("Loss/train"), epochs);
        prop_assert_eq!(sink.count("Loss/test"), epochs);
    }
}
