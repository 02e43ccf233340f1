//! Training loop configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default checkpoint file prefix
pub const DEFAULT_CHECKPOINT_PREFIX: &str = "mnist_lenet_checkpoint";

/// Settings for a [`Trainer`](super::Trainer) run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of training iterations (N)
    pub iterations: usize,
    /// Training batch size
    pub batch_size: usize,
    /// Checkpoint every K completed iterations; 0 disables checkpoints
    pub checkpoint_every: usize,
    /// Number of test batches evaluated after training (M)
    pub test_iterations: usize,
    pub test_batch_size: usize,
    pub checkpoint_dir: PathBuf,
    pub checkpoint_prefix: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: 200,
            batch_size: 64,
            checkpoint_every: 20,
            test_iterations: 100,
            test_batch_size: 100,
            checkpoint_dir: PathBuf::from("checkpoints"),
            checkpoint_prefix: DEFAULT_CHECKPOINT_PREFIX.to_string(),
        }
    }
}

impl TrainConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    pub fn with_test(mut self, iterations: usize, batch_size: usize) -> Self {
        self.test_iterations = iterations;
        self.test_batch_size = batch_size;
        self
    }

    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    pub fn with_checkpoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.checkpoint_prefix = prefix.into();
        self
    }
}
