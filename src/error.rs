//! Error types for the training harness

use std::path::PathBuf;

/// Errors raised while preparing data, running the model or training
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dataset store is missing, empty or corrupted
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    /// Tensor dimensions disagree with what the consumer expects
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A label is outside the model's class range
    #[error("Invalid label {label} (model has {num_classes} classes)")]
    InvalidLabel { label: usize, num_classes: usize },

    /// A named parameter is absent
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Writing a checkpoint failed
    #[error("Failed to write checkpoint {}: {source}", path.display())]
    CheckpointWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a checkpoint failed
    #[error("Failed to read checkpoint {}: {reason}", path.display())]
    CheckpointRead { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reshape failed: {0}")]
    Reshape(#[from] ndarray::ShapeError),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a shape mismatch error
    pub fn shape_mismatch(
        context: impl Into<String>,
        expected: impl Into<Vec<usize>>,
        actual: impl Into<Vec<usize>>,
    ) -> Self {
        Error::ShapeMismatch {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
