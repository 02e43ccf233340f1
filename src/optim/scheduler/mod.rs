//! Learning rate schedulers
//!
//! Schedules are pure functions of the iteration index, so a resumed run picks
//! up exactly the rate it would have had.

mod step_decay;


pub use step_decay::StepDecayLR;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Learning rate at `iteration` (0-based)
    fn lr_at(&self, iteration: usize) -> f32;
}
