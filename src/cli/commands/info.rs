//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, InfoArgs, OutputFormat};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();

            let model = spec
                .model
                .clone()
                .init(spec.training.seed)
                .map_err(|e| format!("Model error: {e}"))?;
            let layers = model.describe().map_err(|e| format!("Model error: {e}"))?;
            println!("{:<8} {:<18} {:>10}", "Layer", "Output", "Params");
            for layer in &layers {
                println!(
                    "{:<8} {:<18} {:>10}",
                    layer.name,
                    format!("{:?}", layer.output_shape),
                    layer.num_params
                );
            }
            let total: usize = layers.iter().map(|l| l.num_params).sum();
            println!("Total parameters: {total}");
            println!();
            println!(
                "Optimizer: sgd (base_lr={}, gamma={}, step_size={})",
                spec.optimizer.base_lr, spec.optimizer.gamma, spec.optimizer.step_size
            );
            println!("Iterations: {}", spec.training.iterations);
            println!("Batch size: {}", spec.data.batch_size);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&spec)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&spec)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
