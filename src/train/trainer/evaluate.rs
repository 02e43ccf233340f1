//! Evaluation-only pass over the test split

use tracing::debug;

use super::result::EvalResult;
use crate::data::{DatasetProvider, Split};
use crate::model::Model;
use crate::train::{Accuracy, CrossEntropyLoss, LossFn, Metric};
use crate::Result;

/// Run `iterations` test batches through `model` with fixed parameters
///
/// Accuracy and loss are the means of the per-batch values. With zero
/// iterations the result is all zeros.
pub fn evaluate<M, P>(
    model: &M,
    provider: &mut P,
    iterations: usize,
    batch_size: usize,
) -> Result<EvalResult>
where
    M: Model + ?Sized,
    P: DatasetProvider + ?Sized,
{
    let mut result = EvalResult::default();
    if iterations == 0 {
        return Ok(result);
    }

    let (mut accuracy_sum, mut loss_sum) = (0.0f64, 0.0f64);
    for i in 0..iterations {
        let batch = provider.next_batch(Split::Test, batch_size)?;
        let predictions = model.forward(&batch.images)?;
        let accuracy = Accuracy.compute(&predictions, &batch.labels)?;
        let loss = CrossEntropyLoss.forward(&predictions, &batch.labels)?;
        debug!(batch = i, accuracy, loss, "Evaluated test batch");

        accuracy_sum += f64::from(accuracy);
        loss_sum += f64::from(loss);
        result.examples += batch.size();
    }

    result.iterations = iterations;
    result.accuracy = (accuracy_sum / iterations as f64) as f32;
    result.loss = (loss_sum / iterations as f64) as f32;
    Ok(result)
}
