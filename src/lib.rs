//! LeNet training harness for handwritten digits
//!
//! The crate is organised around the pieces of a minimal supervised-learning
//! loop:
//!
//! - [`data`] - key-value digit store, IDX conversion and cycling batch providers
//! - [`model`] - named parameters, layer kernels and the LeNet network
//! - [`optim`] - SGD and learning-rate schedules
//! - [`train`] - loss, metrics, checkpoints, callbacks and the [`train::Trainer`]
//! - [`config`] - YAML configuration and CLI argument types
//!
//! # Example
//!
//! ```no_run
//! use lenet_harness::data::SplitProvider;
//! use lenet_harness::model::LeNetConfig;
//! use lenet_harness::optim::{StepDecayLR, SGD};
//! use lenet_harness::train::{TrainConfig, Trainer};
//!
//! let mut provider = SplitProvider::open_stores(
//!     "tutorial_data/mnist/mnist-train-nchw.sqlite",
//!     "tutorial_data/mnist/mnist-test-nchw.sqlite",
//! )?;
//! let model = LeNetConfig::default().init(42)?;
//! let optimizer = SGD::new(StepDecayLR::new(0.1, 1, 0.999), 0.0);
//!
//! let mut trainer = Trainer::new(model, optimizer, TrainConfig::default());
//! let result = trainer.run(&mut provider)?;
//! println!("test accuracy: {:.4}", result.evaluation.accuracy);
//! # Ok::<(), lenet_harness::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
mod error;
pub mod model;
pub mod optim;
pub mod train;

pub use error::{Error, Result};
