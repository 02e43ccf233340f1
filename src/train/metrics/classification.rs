//! Classification metrics

use ndarray::Array2;

use super::trait_def::check_targets;
use super::Metric;
use crate::Result;

/// Index of the largest value in each row; ties go to the first index
pub fn argmax_rows(predictions: &Array2<f32>) -> Vec<usize> {
    predictions
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max {
                        (i, v)
                    } else {
                        (best, max)
                    }
                })
                .0
        })
        .collect()
}

/// Accuracy metric for classification
///
/// Fraction of rows whose first arg-max equals the label.
///
/// # Example
///
/// ```
/// use lenet_harness::train::{Accuracy, Metric};
/// use ndarray::array;
///
/// let pred = array![[0.9, 0.1], [0.2, 0.8], [0.6, 0.4]];
/// let acc = Accuracy.compute(&pred, &[0, 1, 1]).unwrap();
/// assert!((acc - 2.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Metric for Accuracy {
    fn compute(&self, predictions: &Array2<f32>, labels: &[usize]) -> Result<f32> {
        check_targets(predictions, labels)?;
        if labels.is_empty() {
            return Ok(0.0);
        }

        let correct = argmax_rows(predictions)
            .iter()
            .zip(labels)
            .filter(|(pred, label)| pred == label)
            .count();
        Ok(correct as f32 / labels.len() as f32)
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}
