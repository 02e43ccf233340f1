//! Core traits and types for the callback system
//!
//! - `CallbackContext` - State passed to callbacks
//! - `TrainerCallback` - The trait all callbacks implement

use std::path::Path;

use crate::train::trainer::{EvalResult, TrainerState};

/// Context passed to callbacks with current training state
#[derive(Clone, Debug)]
pub struct CallbackContext {
    pub state: TrainerState,
    /// Completed iterations
    pub iteration: usize,
    /// Total iterations planned
    pub max_iterations: usize,
    /// Loss of the last iteration
    pub loss: f32,
    /// Training accuracy of the last iteration
    pub accuracy: f32,
    /// Learning rate applied at the last iteration
    pub lr: f32,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self {
            state: TrainerState::Initializing,
            iteration: 0,
            max_iterations: 0,
            loss: 0.0,
            accuracy: 0.0,
            lr: 0.0,
            elapsed_secs: 0.0,
        }
    }
}

/// Trait for training callbacks
///
/// Implement this trait to hook into training events. All methods have
/// default no-op implementations, so you only need to implement the
/// events you care about.
pub trait TrainerCallback: Send {
    /// Called once the trainer has validated its inputs
    fn on_train_begin(&mut self, _ctx: &CallbackContext) {}

    /// Called on every state transition
    fn on_state_change(&mut self, _from: TrainerState, _to: TrainerState, _ctx: &CallbackContext) {}

    /// Called after each training iteration
    fn on_step_end(&mut self, _ctx: &CallbackContext) {}

    /// Called after a checkpoint has been written
    fn on_checkpoint(&mut self, _path: &Path, _ctx: &CallbackContext) {}

    /// Called after the test pass
    fn on_evaluation_end(&mut self, _result: &EvalResult, _ctx: &CallbackContext) {}

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
