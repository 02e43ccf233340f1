//! Training loop
//!
//! - Loss functions ([`CrossEntropyLoss`]) and metrics ([`Accuracy`])
//! - Per-iteration history ([`MetricsTracker`])
//! - Checkpoint files ([`Checkpoint`], [`CheckpointPolicy`])
//! - Callbacks ([`TrainerCallback`], [`ProgressCallback`])
//! - The [`Trainer`] state machine and the standalone [`evaluate`] pass

pub mod callback;
mod checkpoint;
mod config;
mod loss;
mod metrics;
mod trainer;


pub use callback::{CallbackContext, CallbackManager, ProgressCallback, TrainerCallback};
pub use checkpoint::{Checkpoint, CheckpointPolicy};
pub use config::{TrainConfig, DEFAULT_CHECKPOINT_PREFIX};
pub use loss::{CrossEntropyLoss, LossFn};
pub use metrics::{argmax_rows, Accuracy, Metric, MetricsTracker};
pub use trainer::{evaluate, EvalResult, StepOutput, TrainResult, Trainer, TrainerState};
