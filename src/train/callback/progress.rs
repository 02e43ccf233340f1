//! Progress callback for logging training progress

use std::path::Path;

use tracing::{debug, info};

use super::traits::{CallbackContext, TrainerCallback};
use crate::train::trainer::{EvalResult, TrainerState};

/// Progress callback for logging training progress
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N iterations
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }

    fn should_log(&self, iteration: usize) -> bool {
        self.log_interval > 0 && iteration > 0 && iteration.is_multiple_of(self.log_interval)
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_train_begin(&mut self, ctx: &CallbackContext) {
        info!(
            start = ctx.iteration,
            iterations = ctx.max_iterations,
            "Training started"
        );
    }

    fn on_state_change(&mut self, from: TrainerState, to: TrainerState, ctx: &CallbackContext) {
        debug!(%from, %to, iteration = ctx.iteration, "Trainer state changed");
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) {
        if self.should_log(ctx.iteration) {
            info!(
                "Iteration {}/{}: loss: {:.4}, accuracy: {:.4} (lr: {:.2e}, {:.1}s)",
                ctx.iteration, ctx.max_iterations, ctx.loss, ctx.accuracy, ctx.lr, ctx.elapsed_secs
            );
        }
    }

    fn on_checkpoint(&mut self, path: &Path, ctx: &CallbackContext) {
        info!(iteration = ctx.iteration, path = %path.display(), "Checkpoint saved");
    }

    fn on_evaluation_end(&mut self, result: &EvalResult, _ctx: &CallbackContext) {
        info!(
            "Test accuracy: {:.4} over {} batches ({} examples), loss: {:.4}",
            result.accuracy, result.iterations, result.examples, result.loss
        );
    }

    fn on_train_end(&mut self, ctx: &CallbackContext) {
        info!(
            iterations = ctx.iteration,
            elapsed_secs = ctx.elapsed_secs,
            "Training finished"
        );
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback() {
        let mut progress = ProgressCallback::new(5);
        let ctx = CallbackContext {
            iteration: 5,
            max_iterations: 10,
            loss: 0.5,
            lr: 0.001,
            ..Default::default()
        };

        // Should not panic
        progress.on_train_begin(&ctx);
        progress.on_step_end(&ctx);
        progress.on_checkpoint(Path::new("ckpt_00005.json"), &ctx);
        progress.on_evaluation_end(&EvalResult::default(), &ctx);
        progress.on_train_end(&ctx);
    }

    #[test]
    fn test_progress_callback_interval() {
        let pc = ProgressCallback::new(5);
        assert!(!pc.should_log(0));
        assert!(!pc.should_log(4));
        assert!(pc.should_log(5));
        assert!(pc.should_log(10));
        assert!(!ProgressCallback::new(0).should_log(5));
    }

    #[test]
    fn test_progress_callback_default() {
        let pc = ProgressCallback::default();
        assert_eq!(pc.log_interval, 10);
        assert_eq!(pc.name(), "ProgressCallback");
    }
}
