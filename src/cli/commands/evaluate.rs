//! Evaluate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_eval_overrides, load_checkpoint_model, load_config, EvaluateArgs};
use crate::data::{DigitStore, Split, SplitProvider};
use crate::train::evaluate;

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<(), String> {
    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_eval_overrides(&mut spec, &args);

    let model = load_checkpoint_model(&spec, &args.checkpoint)
        .map_err(|e| format!("Checkpoint error: {e}"))?;
    let store = DigitStore::open(&spec.data.test).map_err(|e| format!("Data error: {e}"))?;
    let mut provider = SplitProvider::new().with_source(Split::Test, store);

    let result = evaluate(
        &model,
        &mut provider,
        spec.training.test_iterations,
        spec.data.test_batch_size,
    )
    .map_err(|e| format!("Evaluation error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Accuracy: {:.4}  Loss: {:.4}  ({} batches, {} examples)",
            result.accuracy, result.loss, result.iterations, result.examples
        ),
    );
    Ok(())
}
