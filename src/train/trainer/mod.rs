//! Trainer: the state machine driving the training loop
//!
//! ```text
//! Initializing -> Running <-> Checkpointing
//!                    |
//!                    v
//!               Evaluating -> Done
//! ```
//!
//! `Initializing` checks that the model has parameters and that the provider
//! serves non-empty splits whose images match the model input. `Running`
//! executes one iteration at a time (fetch batch, forward/backward, loss and
//! accuracy, optimizer step). After every K-th completed iteration the trainer
//! enters `Checkpointing`, writes the parameters and resumes. After N
//! iterations `Evaluating` runs M test batches with fixed parameters.
//!
//! Every error is fatal: the run stops and the error is returned.
//!
//! # Example
//!
//! ```no_run
//! use lenet_harness::data::SplitProvider;
//! use lenet_harness::model::LeNetConfig;
//! use lenet_harness::optim::{StepDecayLR, SGD};
//! use lenet_harness::train::{ProgressCallback, TrainConfig, Trainer};
//!
//! let mut provider = SplitProvider::open_stores("train.sqlite", "test.sqlite")?;
//! let model = LeNetConfig::default().init(0)?;
//! let optimizer = SGD::new(StepDecayLR::new(0.1, 1, 0.999), 0.0);
//!
//! let mut trainer = Trainer::new(model, optimizer, TrainConfig::default());
//! trainer.add_callback(ProgressCallback::new(10));
//! let result = trainer.run(&mut provider)?;
//! # Ok::<(), lenet_harness::Error>(())
//! ```

mod core;
mod evaluate;
mod result;
mod state;
mod step;
mod train_loop;

pub use core::Trainer;
pub use evaluate::evaluate;
pub use result::{EvalResult, StepOutput, TrainResult};
pub use state::TrainerState;
