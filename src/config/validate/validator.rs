//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::HarnessSpec;

/// Validate a run specification
///
/// Checks:
/// - Store paths exist (the test store only when evaluation is enabled)
/// - Numeric values are in valid ranges
/// - The model architecture yields a non-empty feature map
pub fn validate_config(spec: &HarnessSpec) -> Result<(), ValidationError> {
    validate_settings(spec)?;

    if !spec.data.train.exists() {
        return Err(ValidationError::TrainStoreNotFound(
            spec.data.train.display().to_string(),
        ));
    }
    if spec.training.test_iterations > 0 && !spec.data.test.exists() {
        return Err(ValidationError::TestStoreNotFound(
            spec.data.test.display().to_string(),
        ));
    }

    Ok(())
}

/// Validate everything that does not touch the filesystem
pub fn validate_settings(spec: &HarnessSpec) -> Result<(), ValidationError> {
    if spec.data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(spec.data.batch_size));
    }
    if spec.data.test_batch_size == 0 {
        return Err(ValidationError::InvalidTestBatchSize(
            spec.data.test_batch_size,
        ));
    }

    let optimizer = &spec.optimizer;
    if !(optimizer.base_lr > 0.0 && optimizer.base_lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(optimizer.base_lr));
    }
    if !(optimizer.gamma > 0.0 && optimizer.gamma <= 1.0) {
        return Err(ValidationError::InvalidGamma(optimizer.gamma));
    }
    if !(0.0..1.0).contains(&optimizer.momentum) {
        return Err(ValidationError::InvalidMomentum(optimizer.momentum));
    }

    if spec.training.iterations == 0 {
        return Err(ValidationError::InvalidIterations(spec.training.iterations));
    }
    if spec.training.checkpoint_prefix.is_empty() {
        return Err(ValidationError::EmptyCheckpointPrefix);
    }

    spec.model
        .validate()
        .map_err(|e| ValidationError::InvalidModel(e.to_string()))
}
