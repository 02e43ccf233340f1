//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! lenet-harness convert --images train-images-idx3-ubyte --labels train-labels-idx1-ubyte -o train.sqlite
//! lenet-harness train lenet.yaml
//! lenet-harness train lenet.yaml --iterations 50 --resume checkpoints/mnist_lenet_checkpoint_00020.json
//! lenet-harness evaluate lenet.yaml --checkpoint checkpoints/mnist_lenet_checkpoint_00200.json
//! lenet-harness validate lenet.yaml
//! ```

mod core;
mod types;


pub use core::{
    apply_eval_overrides, apply_overrides, parse_args, Cli, Command, ConvertArgs, EvaluateArgs,
    InfoArgs, PredictArgs, TrainArgs, ValidateArgs,
};
pub use types::OutputFormat;
