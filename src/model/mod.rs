//! Models: named parameters, layer kernels and the LeNet network

pub mod layers;
mod lenet;
mod params;

pub use lenet::{LayerSummary, LeNet, LeNetConfig};
pub use params::Parameters;

use ndarray::{Array2, Array4};

use crate::data::Batch;
use crate::Result;

/// Predictions and parameter gradients for one batch
#[derive(Clone, Debug)]
pub struct ForwardPass {
    /// Class probabilities, `[batch, num_classes]`
    pub predictions: Array2<f32>,
    /// Gradients of the mean cross-entropy, keyed like the parameters
    pub gradients: Parameters,
}

/// Parametrized map from an image batch to class probabilities
pub trait Model {
    /// Class probabilities for `images` (`[batch, channels, height, width]`)
    ///
    /// Each row sums to 1. Deterministic for fixed parameters.
    fn forward(&self, images: &Array4<f32>) -> Result<Array2<f32>>;

    /// Forward pass plus gradients of the mean label cross-entropy
    fn backward(&self, batch: &Batch) -> Result<ForwardPass>;

    /// Trainable parameters
    fn parameters(&self) -> &Parameters;

    /// Trainable parameters, mutably
    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Expected image shape `[channels, height, width]`
    fn input_shape(&self) -> [usize; 3];

    /// Model name, recorded in checkpoints
    fn name(&self) -> &str;
}
