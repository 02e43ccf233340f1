//! Stochastic Gradient Descent optimizer

use std::collections::BTreeMap;

use ndarray::{ArrayD, Zip};

use super::{LRScheduler, Optimizer};
use crate::model::Parameters;
use crate::{Error, Result};

/// SGD optimizer with optional momentum
///
/// Plain update: `p <- p - lr * g`. With momentum `mu > 0`:
/// `v <- mu * v - lr * g; p <- p + v`.
pub struct SGD {
    schedule: Box<dyn LRScheduler>,
    momentum: f32,
    velocities: BTreeMap<String, ArrayD<f32>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(schedule: impl LRScheduler + 'static, momentum: f32) -> Self {
        Self {
            schedule: Box::new(schedule),
            momentum,
            velocities: BTreeMap::new(),
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    fn check_gradients(params: &Parameters, grads: &Parameters) -> Result<()> {
        for (name, grad) in grads.iter() {
            let param = params.require(name)?;
            if param.shape() != grad.shape() {
                return Err(Error::shape_mismatch(
                    format!("gradient {name}"),
                    param.shape(),
                    grad.shape(),
                ));
            }
        }
        Ok(())
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut Parameters, grads: &Parameters, iteration: usize) -> Result<()> {
        Self::check_gradients(params, grads)?;
        let lr = self.lr_at(iteration);

        for (name, param) in params.iter_mut() {
            let Some(grad) = grads.get(name) else {
                continue;
            };

            if self.momentum > 0.0 {
                let velocity = self
                    .velocities
                    .entry(name.to_string())
                    .or_insert_with(|| ArrayD::zeros(grad.raw_dim()));
                let momentum = self.momentum;
                Zip::from(&mut *velocity)
                    .and(grad)
                    .for_each(|v, &g| *v = momentum * *v - lr * g);
                *param += &*velocity;
            } else {
                param.scaled_add(-lr, grad);
            }
        }
        Ok(())
    }

    fn lr_at(&self, iteration: usize) -> f32 {
        self.schedule.lr_at(iteration)
    }

    fn name(&self) -> &str {
        "sgd"
    }
}
