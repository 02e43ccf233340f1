//! lenet-harness CLI
//!
//! # Usage
//!
//! ```bash
//! # Build the stores from the raw IDX files
//! lenet-harness convert --images train-images-idx3-ubyte --labels train-labels-idx1-ubyte -o train.sqlite
//!
//! # Train from config, with overrides
//! lenet-harness train lenet.yaml --iterations 500 --lr 0.05
//!
//! # Evaluate a checkpoint
//! lenet-harness evaluate lenet.yaml --checkpoint checkpoints/mnist_lenet_checkpoint_00200.json
//! ```

use clap::Parser;
use lenet_harness::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
