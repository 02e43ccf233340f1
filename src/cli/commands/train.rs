//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, train_from_spec, validate_config, TrainArgs};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("lenet-harness: training from {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);

    if args.dry_run {
        validate_config(&spec).map_err(|e| format!("Validation failed: {e}"))?;
        log(
            level,
            LogLevel::Normal,
            "Dry run - config validated successfully",
        );
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Optimizer: sgd (base_lr={}, gamma={}, step_size={}, momentum={})",
                spec.optimizer.base_lr,
                spec.optimizer.gamma,
                spec.optimizer.step_size,
                spec.optimizer.momentum
            ),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!("  Iterations: {}", spec.training.iterations),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!("  Batch size: {}", spec.data.batch_size),
        );
        return Ok(());
    }

    let result = train_from_spec(&spec, args.resume.as_deref())
        .map_err(|e| format!("Training error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} iterations, final loss {:.4}, {} checkpoints",
            result.iterations,
            result.final_loss,
            result.checkpoints.len()
        ),
    );
    if result.evaluation.iterations > 0 {
        log(
            level,
            LogLevel::Normal,
            &format!(
                "Test accuracy: {:.4} over {} examples",
                result.evaluation.accuracy, result.evaluation.examples
            ),
        );
    }
    Ok(())
}
