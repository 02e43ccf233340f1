//! Training callbacks
//!
//! Callbacks observe the trainer; they cannot alter or stop a run.
//!
//! - [`TrainerCallback`] - the trait all callbacks implement
//! - [`CallbackManager`] - dispatches events to registered callbacks
//! - [`ProgressCallback`] - logs progress through `tracing`

mod manager;
mod progress;
mod traits;

pub use manager::CallbackManager;
pub use progress::ProgressCallback;
pub use traits::{CallbackContext, TrainerCallback};
