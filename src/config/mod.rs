//! Declarative run configuration
//!
//! A YAML file deserializes into a [`HarnessSpec`]; [`validate_config`]
//! checks it before any work starts and [`train_from_spec`] turns it into a
//! model, optimizer and trainer. The clap argument types for the binary live
//! here too, next to the overrides they apply to a spec.

mod cli;
mod schema;
mod train;
mod validate;

pub use cli::{
    apply_eval_overrides, apply_overrides, parse_args, Cli, Command, ConvertArgs, EvaluateArgs,
    InfoArgs, OutputFormat, PredictArgs, TrainArgs, ValidateArgs,
};
pub use schema::{DataSpec, HarnessSpec, OptimSpec, TrainingParams};
pub use train::{
    build_model, build_optimizer, load_checkpoint_model, load_config, open_provider,
    train_from_spec, train_from_yaml,
};
pub use validate::{validate_config, validate_settings, ValidationError};
