//! Predict command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_checkpoint_model, load_config, PredictArgs};
use crate::data::{Batch, DigitStore};
use crate::model::Model;
use crate::train::argmax_rows;

pub fn run_predict(args: PredictArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let model = load_checkpoint_model(&spec, &args.checkpoint)
        .map_err(|e| format!("Checkpoint error: {e}"))?;
    let store = DigitStore::open(&spec.data.test).map_err(|e| format!("Data error: {e}"))?;

    let end = args.index.saturating_add(args.count).min(store.len());
    if args.index >= end {
        return Err(format!(
            "Index {} is outside the test store ({} records)",
            args.index,
            store.len()
        ));
    }

    let records = (args.index..end)
        .map(|i| store.get(i))
        .collect::<crate::Result<Vec<_>>>()
        .map_err(|e| format!("Data error: {e}"))?;
    let batch =
        Batch::from_records(&records, store.shape()).map_err(|e| format!("Data error: {e}"))?;
    let probabilities = model
        .forward(&batch.images)
        .map_err(|e| format!("Prediction error: {e}"))?;
    let predicted = argmax_rows(&probabilities);

    let mut correct = 0;
    for (offset, (&label, &guess)) in batch.labels.iter().zip(&predicted).enumerate() {
        if label == guess {
            correct += 1;
        }
        println!(
            "#{:<6} label {label}  predicted {guess}  p={:.4}",
            args.index + offset,
            probabilities[[offset, guess]]
        );
    }
    log(
        level,
        LogLevel::Normal,
        &format!("{correct}/{} correct", predicted.len()),
    );
    Ok(())
}
