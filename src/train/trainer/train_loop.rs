//! The full training run

use std::time::Instant;

use tracing::{info, warn};

use super::core::Trainer;
use super::evaluate::evaluate;
use super::result::TrainResult;
use super::state::TrainerState;
use crate::data::{DatasetProvider, Split};
use crate::model::Model;
use crate::{Error, Result};

impl<M: Model> Trainer<M> {
    /// Run the state machine to completion
    ///
    /// Trains until `config.iterations` iterations have completed (counting any
    /// restored by [`Trainer::resume_from`]), checkpointing every
    /// `config.checkpoint_every`, then evaluates `config.test_iterations` test
    /// batches. The first error aborts the run and is returned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use lenet_harness::data::SplitProvider;
    /// # use lenet_harness::model::LeNet;
    /// # use lenet_harness::train::Trainer;
    /// # let mut trainer: Trainer<LeNet> = todo!();
    /// # let mut provider: SplitProvider = todo!();
    /// let result = trainer.run(&mut provider)?;
    /// println!(
    ///     "{} iterations, final loss {:.4}, test accuracy {:.4}",
    ///     result.iterations, result.final_loss, result.evaluation.accuracy
    /// );
    /// # Ok::<(), lenet_harness::Error>(())
    /// ```
    pub fn run<P>(&mut self, provider: &mut P) -> Result<TrainResult>
    where
        P: DatasetProvider + ?Sized,
    {
        if self.state != TrainerState::Initializing {
            return Err(Error::ConfigError(format!(
                "trainer already ran (state: {})",
                self.state
            )));
        }
        self.start_time = Some(Instant::now());
        self.initialize(provider)?;

        let ctx = self.build_context();
        self.callbacks.on_train_begin(&ctx);
        self.transition(TrainerState::Running)?;

        while self.iteration < self.config.iterations {
            let batch = provider.next_batch(Split::Train, self.config.batch_size)?;
            let step = self.train_step(&batch)?;

            let ctx = self.build_context();
            self.callbacks.on_step_end(&ctx);

            if self.checkpoints.is_due(self.iteration) {
                self.transition(TrainerState::Checkpointing)?;
                let path = self.write_checkpoint(step.lr)?;
                let ctx = self.build_context();
                self.callbacks.on_checkpoint(&path, &ctx);
                self.transition(TrainerState::Running)?;
            }
        }

        self.transition(TrainerState::Evaluating)?;
        let evaluation = evaluate(
            &self.model,
            provider,
            self.config.test_iterations,
            self.config.test_batch_size,
        )?;
        if evaluation.iterations > 0 {
            self.metrics.record_test(evaluation.accuracy);
        }
        let ctx = self.build_context();
        self.callbacks.on_evaluation_end(&evaluation, &ctx);

        self.transition(TrainerState::Done)?;
        let ctx = self.build_context();
        self.callbacks.on_train_end(&ctx);

        Ok(TrainResult {
            iterations: self.iteration,
            final_loss: self.metrics.last_loss().unwrap_or(0.0),
            history: self.metrics.clone(),
            checkpoints: self.written.clone(),
            evaluation,
            elapsed_secs: ctx.elapsed_secs,
        })
    }

    /// Checks performed in the `Initializing` state
    fn initialize<P>(&mut self, provider: &P) -> Result<()>
    where
        P: DatasetProvider + ?Sized,
    {
        if self.model.parameters().is_empty() {
            return Err(Error::MissingParameter(format!(
                "model {} has no parameters",
                self.model.name()
            )));
        }
        if self.config.batch_size == 0 {
            return Err(Error::ConfigError("batch_size must be > 0".to_string()));
        }
        self.check_split(provider, Split::Train)?;

        if self.config.test_iterations > 0 {
            if self.config.test_batch_size == 0 {
                return Err(Error::ConfigError("test_batch_size must be > 0".to_string()));
            }
            self.check_split(provider, Split::Test)?;
        }

        if self.config.checkpoint_every > 0 {
            if let Some(latest) = self.checkpoints.latest()? {
                warn!(
                    path = %latest.display(),
                    "Checkpoint directory already holds checkpoints; matching files will be overwritten"
                );
            }
        }

        info!(
            model = self.model.name(),
            parameters = self.model.parameters().num_elements(),
            optimizer = self.optimizer.name(),
            loss = self.loss_fn.name(),
            start = self.iteration,
            iterations = self.config.iterations,
            "Trainer initialized"
        );
        Ok(())
    }

    fn check_split<P>(&self, provider: &P, split: Split) -> Result<()>
    where
        P: DatasetProvider + ?Sized,
    {
        if provider.len(split)? == 0 {
            return Err(Error::DataUnavailable(format!("{split} split is empty")));
        }
        let shape = provider.image_shape(split)?;
        let expected = self.model.input_shape();
        if shape != expected {
            return Err(Error::shape_mismatch(
                format!("{split} images"),
                expected,
                shape,
            ));
        }
        Ok(())
    }
}
