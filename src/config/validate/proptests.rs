//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_settings;
use crate::config::schema::HarnessSpec;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = HarnessSpec> {
    (
        1usize..256,  // batch_size
        1e-6f32..1.0, // base_lr
        0.01f32..1.0, // gamma
        0.0f32..0.99, // momentum
        1usize..1000, // iterations
        0usize..100,  // checkpoint_every
    )
        .prop_map(
            |(batch_size, base_lr, gamma, momentum, iterations, checkpoint_every)| {
                let mut spec = HarnessSpec::new("train.sqlite", "test.sqlite");
                spec.data.batch_size = batch_size;
                spec.optimizer.base_lr = base_lr;
                spec.optimizer.gamma = gamma;
                spec.optimizer.momentum = momentum;
                spec.training.iterations = iterations;
                spec.training.checkpoint_every = checkpoint_every;
                spec
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_settings(&spec).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.data.batch_size = 0;
        prop_assert!(matches!(
            validate_settings(&spec),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn prop_large_lr_fails(spec in arb_valid_spec(), lr in 1.0001f32..100.0) {
        let mut spec = spec;
        spec.optimizer.base_lr = lr;
        prop_assert!(matches!(
            validate_settings(&spec),
            Err(ValidationError::InvalidLearningRate(_))
        ));
    }
}
