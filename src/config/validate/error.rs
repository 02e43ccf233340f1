//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Training store does not exist: {0}")]
    TrainStoreNotFound(String),

    #[error("Test store does not exist: {0}")]
    TestStoreNotFound(String),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid gamma: {0} (must be > 0.0 and <= 1.0)")]
    InvalidGamma(f32),

    #[error("Invalid momentum: {0} (must be in [0.0, 1.0))")]
    InvalidMomentum(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid test batch size: {0} (must be > 0)")]
    InvalidTestBatchSize(usize),

    #[error("Invalid iterations: {0} (must be > 0)")]
    InvalidIterations(usize),

    #[error("Checkpoint prefix cannot be empty")]
    EmptyCheckpointPrefix,

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
