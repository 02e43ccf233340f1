//! Core CLI types - Cli, Command and per-command argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;
use crate::config::HarnessSpec;

/// LeNet training harness for handwritten digits
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "lenet-harness")]
#[command(version)]
#[command(about = "Prepare digit stores, train LeNet with step-decayed SGD and evaluate checkpoints")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert IDX image and label files into a digit store
    Convert(ConvertArgs),

    /// Train a model from YAML configuration
    Train(TrainArgs),

    /// Evaluate a checkpoint on the test split
    Evaluate(EvaluateArgs),

    /// Print predictions of a checkpoint for test examples
    Predict(PredictArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display information about a configuration
    Info(InfoArgs),
}

/// Arguments for the convert command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ConvertArgs {
    /// IDX3 image file
    #[arg(long)]
    pub images: PathBuf,

    /// IDX1 label file
    #[arg(long)]
    pub labels: PathBuf,

    /// Store file to create
    #[arg(short, long)]
    pub output: PathBuf,

    /// Replace an existing store
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override number of iterations
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override base learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Checkpoint every N iterations (0 disables)
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Override initialization seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Resume training from checkpoint
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Checkpoint to evaluate
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// Override number of test batches
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Override test batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

/// Arguments for the predict command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PredictArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Checkpoint to load
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// First test example
    #[arg(short, long, default_value_t = 0)]
    pub index: usize,

    /// Number of examples
    #[arg(long, default_value_t = 10)]
    pub count: usize,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show detailed configuration summary
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a HarnessSpec
pub fn apply_overrides(spec: &mut HarnessSpec, args: &TrainArgs) {
    if let Some(iterations) = args.iterations {
        spec.training.iterations = iterations;
    }
    if let Some(batch_size) = args.batch_size {
        spec.data.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        spec.optimizer.base_lr = lr;
    }
    if let Some(every) = args.checkpoint_every {
        spec.training.checkpoint_every = every;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = seed;
    }
}

/// Apply command-line overrides for evaluation
pub fn apply_eval_overrides(spec: &mut HarnessSpec, args: &EvaluateArgs) {
    if let Some(iterations) = args.iterations {
        spec.training.test_iterations = iterations;
    }
    if let Some(batch_size) = args.batch_size {
        spec.data.test_batch_size = batch_size;
    }
}
