//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, validate_config, HarnessSpec, ValidateArgs};

/// Format data configuration as a string
pub fn format_data_info(spec: &HarnessSpec) -> String {
    [
        format!("  Training store: {}", spec.data.train.display()),
        format!("  Test store: {}", spec.data.test.display()),
        format!("  Batch size: {}", spec.data.batch_size),
        format!("  Test batch size: {}", spec.data.test_batch_size),
    ]
    .join("\n")
}

/// Format model configuration as a string
pub fn format_model_info(spec: &HarnessSpec) -> String {
    let model = &spec.model;
    [
        format!(
            "  Input: {}x{}x{}, {} classes",
            model.in_channels, model.height, model.width, model.num_classes
        ),
        format!(
            "  Conv channels: {} / {} (kernel {}, pool {})",
            model.conv1_channels, model.conv2_channels, model.kernel, model.pool
        ),
        format!("  Hidden units: {}", model.hidden),
    ]
    .join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(spec: &HarnessSpec) -> String {
    let optim = &spec.optimizer;
    let mut lines = vec![
        "  Optimizer: sgd".to_string(),
        format!("  Base learning rate: {}", optim.base_lr),
        format!("  Decay: gamma {} every {} iterations", optim.gamma, optim.step_size),
    ];
    if optim.momentum > 0.0 {
        lines.push(format!("  Momentum: {}", optim.momentum));
    }
    lines.join("\n")
}

/// Format training configuration as a string
pub fn format_training_info(spec: &HarnessSpec) -> String {
    let training = &spec.training;
    let mut lines = vec![format!("  Iterations: {}", training.iterations)];
    if training.checkpoint_every > 0 {
        lines.push(format!(
            "  Checkpoints: every {} into {}/{}_*.json",
            training.checkpoint_every,
            training.checkpoint_dir.display(),
            training.checkpoint_prefix
        ));
    } else {
        lines.push("  Checkpoints: disabled".to_string());
    }
    lines.push(format!("  Test iterations: {}", training.test_iterations));
    lines.push(format!("  Seed: {}", training.seed));
    if let Some(history) = &training.history {
        lines.push(format!("  History: {}", history.display()));
    }
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(spec: &HarnessSpec) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_data_info(spec));
    println!();
    println!("{}", format_model_info(spec));
    println!();
    println!("{}", format_optimizer_info(spec));
    println!();
    println!("{}", format_training_info(spec));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_config(&spec).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        print_detailed_summary(&spec);
    }
    Ok(())
}
