//! Training result types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::train::MetricsTracker;

/// Outcome of one training iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    pub loss: f32,
    pub accuracy: f32,
    /// Learning rate applied in this step
    pub lr: f32,
}

/// Outcome of an evaluation pass over the test split
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Number of test batches evaluated
    pub iterations: usize,
    /// Number of examples seen
    pub examples: usize,
    /// Mean of the per-batch accuracies
    pub accuracy: f32,
    /// Mean of the per-batch cross-entropy losses
    pub loss: f32,
}

/// Result of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainResult {
    /// Completed iteration count
    pub iterations: usize,
    /// Loss of the last iteration (0.0 if none ran)
    pub final_loss: f32,
    /// Per-iteration loss, accuracy and learning rate
    pub history: MetricsTracker,
    /// Checkpoints written during this run, in order
    pub checkpoints: Vec<PathBuf>,
    pub evaluation: EvalResult,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_result_default() {
        let eval = EvalResult::default();
        assert_eq!(eval.iterations, 0);
        assert_eq!(eval.accuracy, 0.0);
    }

    #[test]
    fn test_train_result_clone() {
        let result = TrainResult {
            iterations: 5,
            final_loss: 0.1,
            history: MetricsTracker::new(),
            checkpoints: vec![PathBuf::from("c_00002.json")],
            evaluation: EvalResult::default(),
            elapsed_secs: 10.0,
        };
        let cloned = result.clone();
        assert_eq!(result.iterations, cloned.iterations);
        assert_eq!(result.checkpoints, cloned.checkpoints);
    }
}
