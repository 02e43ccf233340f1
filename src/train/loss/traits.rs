//! Loss function trait

use ndarray::Array2;

use crate::Result;

/// Trait for loss functions
pub trait LossFn {
    /// Scalar loss of class `predictions` (`[batch, classes]`) against labels
    fn forward(&self, predictions: &Array2<f32>, labels: &[usize]) -> Result<f32>;

    /// Name of the loss function
    fn name(&self) -> &str;
}
