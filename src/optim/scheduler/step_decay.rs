//! Step decay learning rate scheduler

use serde::{Deserialize, Serialize};

use super::LRScheduler;

/// Step Decay Learning Rate Scheduler
///
/// Multiplies learning rate by gamma every step_size iterations.
///
/// Formula: lr_t = lr_initial * gamma^(floor(t / step_size))
///
/// With `step_size = 1` this is plain exponential decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepDecayLR {
    lr_initial: f32,
    gamma: f32,
    step_size: usize,
}

impl StepDecayLR {
    /// Create a new step decay scheduler
    ///
    /// # Arguments
    /// * `lr_initial` - Initial learning rate
    /// * `step_size` - Decay LR every step_size iterations
    /// * `gamma` - Multiplicative factor (e.g., 0.999 per iteration)
    pub fn new(lr_initial: f32, step_size: usize, gamma: f32) -> Self {
        Self {
            lr_initial,
            gamma,
            step_size,
        }
    }

    pub fn lr_initial(&self) -> f32 {
        self.lr_initial
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }
}

impl LRScheduler for StepDecayLR {
    fn lr_at(&self, iteration: usize) -> f32 {
        if self.step_size == 0 {
            return self.lr_initial;
        }
        let num_decays = iteration / self.step_size;
        self.lr_initial * self.gamma.powf(num_decays as f32)
    }
}
