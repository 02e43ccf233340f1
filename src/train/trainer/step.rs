//! Training step operations

use std::path::PathBuf;

use tracing::debug;

use super::core::Trainer;
use super::result::StepOutput;
use crate::data::Batch;
use crate::model::Model;
use crate::train::checkpoint::Checkpoint;
use crate::train::{Accuracy, Metric};
use crate::Result;

impl<M: Model> Trainer<M> {
    /// Perform a single training iteration on `batch`
    ///
    /// Runs the forward and backward pass, computes loss and accuracy, applies
    /// the optimizer with the scheduled learning rate and records the result.
    /// On error the parameters and the iteration count are left unchanged.
    pub fn train_step(&mut self, batch: &Batch) -> Result<StepOutput> {
        let pass = self.model.backward(batch)?;
        let loss = self.loss_fn.forward(&pass.predictions, &batch.labels)?;
        let accuracy = Accuracy.compute(&pass.predictions, &batch.labels)?;

        let lr = self.optimizer.lr_at(self.iteration);
        self.optimizer
            .step(self.model.parameters_mut(), &pass.gradients, self.iteration)?;

        self.iteration += 1;
        self.metrics.record_step(loss, accuracy, lr);
        debug!(iteration = self.iteration, loss, accuracy, lr, "Step");

        Ok(StepOutput { loss, accuracy, lr })
    }

    /// Write a checkpoint for the current iteration, blocking until it is on disk
    pub(crate) fn write_checkpoint(&mut self, lr: f32) -> Result<PathBuf> {
        let path = self.checkpoints.path_for(self.iteration);
        Checkpoint::new(
            self.iteration,
            lr,
            self.model.name(),
            self.model.parameters().clone(),
        )
        .save(&path)?;
        self.written.push(path.clone());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::Batch;
    use crate::model::{LeNetConfig, Model};
    use crate::optim::{StepDecayLR, SGD};
    use crate::train::{Checkpoint, TrainConfig, Trainer};
    use crate::Error;
    use ndarray::Array4;

    fn trainer(dir: &std::path::Path) -> Trainer<crate::model::LeNet> {
        let model = LeNetConfig::default()
            .with_input(1, 12, 12)
            .with_num_classes(2)
            .with_conv_channels(2, 3)
            .with_hidden(4)
            .with_kernel(3)
            .init(1)
            .unwrap();
        let config = TrainConfig::default()
            .with_checkpoint_dir(dir)
            .with_checkpoint_prefix("unit");
        Trainer::new(model, SGD::new(StepDecayLR::new(0.1, 1, 0.9), 0.0), config)
    }

    fn batch() -> Batch {
        let images = Array4::from_shape_fn((2, 1, 12, 12), |(b, _, y, x)| {
            if b == 0 {
                0.1
            } else {
                ((x + y) % 4) as f32 / 4.0
            }
        });
        Batch::new(images, vec![0, 1]).unwrap()
    }

    #[test]
    fn test_train_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let before = trainer.model().parameters().clone();

        let out = trainer.train_step(&batch()).unwrap();

        assert!(out.loss > 0.0 && out.loss.is_finite());
        assert!((0.0..=1.0).contains(&out.accuracy));
        assert_eq!(out.lr, 0.1);
        assert_eq!(trainer.iteration(), 1);
        assert_eq!(trainer.metrics.steps(), 1);
        assert_ne!(trainer.model().parameters(), &before);

        let out = trainer.train_step(&batch()).unwrap();
        assert!((out.lr - 0.09).abs() < 1e-7);
    }

    #[test]
    fn test_train_step_error_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        let before = trainer.model().parameters().clone();

        let bad = Batch::new(Array4::zeros((1, 1, 10, 10)), vec![0]).unwrap();
        assert!(matches!(
            trainer.train_step(&bad),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(trainer.iteration(), 0);
        assert_eq!(trainer.model().parameters(), &before);
    }

    #[test]
    fn test_write_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = trainer(dir.path());
        trainer.train_step(&batch()).unwrap();

        let path = trainer.write_checkpoint(0.1).unwrap();
        assert_eq!(path, dir.path().join("unit_00001.json"));

        let checkpoint = Checkpoint::load(&path).unwrap();
        assert_eq!(checkpoint.iteration, 1);
        assert_eq!(checkpoint.model, "lenet");
        assert_eq!(&checkpoint.parameters, trainer.model().parameters());
    }
}
