//! Optimizer trait

use crate::model::Parameters;
use crate::Result;

/// Trait for optimization algorithms
pub trait Optimizer {
    /// Update `params` in place from `grads` for the given iteration
    ///
    /// Parameters without a gradient are left unchanged. A gradient naming an
    /// unknown parameter or with a different shape is rejected before any
    /// parameter is modified.
    fn step(&mut self, params: &mut Parameters, grads: &Parameters, iteration: usize)
        -> Result<()>;

    /// Learning rate used at `iteration`
    fn lr_at(&self, iteration: usize) -> f32;

    /// Optimizer name for logs and checkpoints
    fn name(&self) -> &str;
}
