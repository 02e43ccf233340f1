//! Cross Entropy Loss for classification

use ndarray::Array2;

use super::LossFn;
use crate::train::metrics::check_targets;
use crate::Result;

/// Probabilities are clamped here before taking the log
pub const MIN_PROBABILITY: f32 = 1e-20;

/// Cross Entropy Loss over softmax outputs
///
/// L = mean_i(-ln(max(p[i, label_i], 1e-20)))
///
/// Predictions are probabilities (the model's softmax output), not logits.
///
/// # Example
///
/// ```
/// use lenet_harness::train::{CrossEntropyLoss, LossFn};
/// use ndarray::array;
///
/// let probs = array![[0.7, 0.2, 0.1], [0.1, 0.8, 0.1]];
/// let loss = CrossEntropyLoss.forward(&probs, &[0, 1]).unwrap();
/// assert!(loss > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Array2<f32>, labels: &[usize]) -> Result<f32> {
        check_targets(predictions, labels)?;
        if labels.is_empty() {
            return Ok(0.0);
        }

        let total: f32 = labels
            .iter()
            .enumerate()
            .map(|(row, &label)| -predictions[[row, label]].max(MIN_PROBABILITY).ln())
            .sum();
        Ok(total / labels.len() as f32)
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_cross_entropy_loss() {
        let probs = array![[0.5, 0.25, 0.25], [0.1, 0.1, 0.8]];
        let loss = CrossEntropyLoss.forward(&probs, &[0, 2]).unwrap();

        let expected = (-(0.5f32).ln() - (0.8f32).ln()) / 2.0;
        assert_relative_eq!(loss, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_cross_entropy_perfect_prediction() {
        let probs = array![[1.0, 0.0], [0.0, 1.0]];
        let loss = CrossEntropyLoss.forward(&probs, &[0, 1]).unwrap();
        assert_relative_eq!(loss, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_cross_entropy_clamps_zero_probability() {
        let probs = array![[1.0, 0.0]];
        let loss = CrossEntropyLoss.forward(&probs, &[1]).unwrap();

        assert!(loss.is_finite());
        assert_relative_eq!(loss, -(MIN_PROBABILITY.ln()), epsilon = 1e-3);
    }

    #[test]
    fn test_cross_entropy_row_mismatch() {
        let probs = array![[0.5, 0.5]];
        assert!(matches!(
            CrossEntropyLoss.forward(&probs, &[0, 1]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_entropy_invalid_label() {
        let probs = array![[0.5, 0.5]];
        assert!(matches!(
            CrossEntropyLoss.forward(&probs, &[2]),
            Err(Error::InvalidLabel { label: 2, num_classes: 2 })
        ));
    }
}
