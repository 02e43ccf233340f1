//! Core Metric trait definition

use ndarray::Array2;

use crate::{Error, Result};

/// Trait for evaluation metrics
pub trait Metric {
    /// Compute the metric given class predictions (`[batch, classes]`) and labels
    fn compute(&self, predictions: &Array2<f32>, labels: &[usize]) -> Result<f32>;

    /// Name of the metric
    fn name(&self) -> &str;

    /// Whether higher values are better (true) or lower (false)
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Check one prediction row per label and every label within the class range
pub(crate) fn check_targets(predictions: &Array2<f32>, labels: &[usize]) -> Result<()> {
    if predictions.nrows() != labels.len() {
        return Err(Error::shape_mismatch(
            "prediction rows",
            [labels.len()],
            [predictions.nrows()],
        ));
    }
    let num_classes = predictions.ncols();
    match labels.iter().find(|&&l| l >= num_classes) {
        Some(&label) => Err(Error::InvalidLabel { label, num_classes }),
        None => Ok(()),
    }
}
