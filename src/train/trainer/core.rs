//! Core Trainer struct and basic methods

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use super::state::TrainerState;
use crate::model::Model;
use crate::optim::Optimizer;
use crate::train::callback::{CallbackContext, CallbackManager, TrainerCallback};
use crate::train::checkpoint::{Checkpoint, CheckpointPolicy};
use crate::train::{CrossEntropyLoss, LossFn, MetricsTracker, TrainConfig};
use crate::{Error, Result};

/// Trainer that owns a model and drives it through the training state machine
pub struct Trainer<M: Model> {
    pub(crate) model: M,

    pub(crate) optimizer: Box<dyn Optimizer>,

    pub(crate) loss_fn: Box<dyn LossFn>,

    pub(crate) config: TrainConfig,

    pub(crate) checkpoints: CheckpointPolicy,

    /// Per-iteration history
    pub metrics: MetricsTracker,

    pub(crate) callbacks: CallbackManager,

    pub(crate) state: TrainerState,

    /// Completed iterations
    pub(crate) iteration: usize,

    /// Checkpoints written by this trainer
    pub(crate) written: Vec<PathBuf>,

    pub(crate) start_time: Option<Instant>,
}

impl<M: Model> Trainer<M> {
    /// Create a new trainer in the `Initializing` state
    ///
    /// The loss defaults to [`CrossEntropyLoss`].
    pub fn new(model: M, optimizer: impl Optimizer + 'static, config: TrainConfig) -> Self {
        Self {
            model,
            optimizer: Box::new(optimizer),
            loss_fn: Box::new(CrossEntropyLoss),
            checkpoints: CheckpointPolicy::from_config(&config),
            config,
            metrics: MetricsTracker::new(),
            callbacks: CallbackManager::new(),
            state: TrainerState::Initializing,
            iteration: 0,
            written: Vec::new(),
            start_time: None,
        }
    }

    /// Set the loss function
    pub fn set_loss(&mut self, loss_fn: Box<dyn LossFn>) {
        self.loss_fn = loss_fn;
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Restore parameters and the completed iteration count from a checkpoint
    ///
    /// Only allowed before [`Trainer::run`]. The checkpoint's parameters must
    /// match the model's names and shapes.
    pub fn resume_from(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        if self.state != TrainerState::Initializing {
            return Err(Error::ConfigError(format!(
                "cannot resume while {}",
                self.state
            )));
        }
        if checkpoint.iteration > self.config.iterations {
            return Err(Error::ConfigError(format!(
                "checkpoint is at iteration {} but the run has only {} iterations",
                checkpoint.iteration, self.config.iterations
            )));
        }

        self.model
            .parameters()
            .check_compatible(&checkpoint.parameters)?;
        *self.model.parameters_mut() = checkpoint.parameters.clone();
        self.iteration = checkpoint.iteration;
        self.metrics = MetricsTracker::starting_at(checkpoint.iteration);

        info!(
            iteration = checkpoint.iteration,
            model = %checkpoint.model,
            "Resumed from checkpoint"
        );
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume the trainer, returning the trained model
    pub fn into_model(self) -> M {
        self.model
    }

    /// Learning rate for the next iteration
    pub fn lr(&self) -> f32 {
        self.optimizer.lr_at(self.iteration)
    }

    /// Get reference to callback manager
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Build callback context from current state
    pub(crate) fn build_context(&self) -> CallbackContext {
        let last = |values: &[f32]| values.last().copied().unwrap_or(0.0);
        CallbackContext {
            state: self.state,
            iteration: self.iteration,
            max_iterations: self.config.iterations,
            loss: last(&self.metrics.loss),
            accuracy: last(&self.metrics.accuracy),
            lr: last(&self.metrics.learning_rate),
            elapsed_secs: self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64()),
        }
    }

    /// Move to `next`, notifying callbacks
    pub(crate) fn transition(&mut self, next: TrainerState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::ConfigError(format!(
                "invalid trainer transition {} -> {next}",
                self.state
            )));
        }
        let from = self.state;
        self.state = next;
        let ctx = self.build_context();
        self.callbacks.on_state_change(from, next, &ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeNetConfig;
    use crate::optim::{StepDecayLR, SGD};
    use crate::train::ProgressCallback;

    fn tiny() -> LeNetConfig {
        LeNetConfig::default()
            .with_input(1, 12, 12)
            .with_num_classes(2)
            .with_conv_channels(2, 3)
            .with_hidden(4)
            .with_kernel(3)
    }

    fn trainer(config: TrainConfig) -> Trainer<crate::model::LeNet> {
        let model = tiny().init(0).unwrap();
        Trainer::new(model, SGD::new(StepDecayLR::new(0.1, 1, 0.5), 0.0), config)
    }

    #[test]
    fn test_trainer_creation() {
        let trainer = trainer(TrainConfig::default());
        assert_eq!(trainer.state(), TrainerState::Initializing);
        assert_eq!(trainer.iteration(), 0);
        assert_eq!(trainer.lr(), 0.1);
        assert!(trainer.callbacks().is_empty());
    }

    #[test]
    fn test_add_callback() {
        let mut trainer = trainer(TrainConfig::default());
        trainer.add_callback(ProgressCallback::new(5));
        assert!(!trainer.callbacks().is_empty());
    }

    #[test]
    fn test_resume_from_restores_iteration() {
        let mut trainer = trainer(TrainConfig::default().with_iterations(10));
        let mut params = trainer.model().parameters().zeros_like();
        for (_, tensor) in params.iter_mut() {
            tensor.fill(0.5);
        }
        let checkpoint = Checkpoint::new(4, 0.1, "lenet", params.clone());

        trainer.resume_from(&checkpoint).unwrap();
        assert_eq!(trainer.iteration(), 4);
        assert_eq!(trainer.model().parameters(), &params);
        assert_eq!(trainer.lr(), 0.1 * 0.5f32.powi(4));
        assert_eq!(trainer.metrics.first_iteration, 4);
    }

    #[test]
    fn test_resume_rejects_mismatched_parameters() {
        let mut trainer = trainer(TrainConfig::default());
        let other = tiny().with_hidden(5).init(0).unwrap();
        let checkpoint = Checkpoint::new(1, 0.1, "lenet", other.parameters().clone());

        assert!(matches!(
            trainer.resume_from(&checkpoint),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(trainer.iteration(), 0);
    }

    #[test]
    fn test_resume_beyond_run_length() {
        let mut trainer = trainer(TrainConfig::default().with_iterations(3));
        let params = trainer.model().parameters().clone();
        let checkpoint = Checkpoint::new(4, 0.1, "lenet", params);
        assert!(matches!(
            trainer.resume_from(&checkpoint),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut trainer = trainer(TrainConfig::default());
        assert!(trainer.transition(TrainerState::Done).is_err());
        assert!(trainer.transition(TrainerState::Running).is_ok());
        assert_eq!(trainer.state(), TrainerState::Running);
    }
}
