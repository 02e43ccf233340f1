//! Convert command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::ConvertArgs;
use crate::data::convert_idx_to_store;

pub fn run_convert(args: ConvertArgs, level: LogLevel) -> Result<(), String> {
    if args.output.exists() && !args.force {
        log(
            level,
            LogLevel::Normal,
            &format!(
                "Store {} already exists, skipping (use --force to rebuild)",
                args.output.display()
            ),
        );
        return Ok(());
    }

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Converting {} + {}",
            args.images.display(),
            args.labels.display()
        ),
    );

    let count = convert_idx_to_store(&args.images, &args.labels, &args.output)
        .map_err(|e| format!("Conversion failed: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Wrote {count} records to {}", args.output.display()),
    );
    Ok(())
}
