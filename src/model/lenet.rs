//! LeNet: two conv/max-pool stages followed by two fully connected layers
//!
//! ```text
//! conv1 (k, c1) -> pool1 -> conv2 (k, c2) -> pool2 -> fc3 (hidden) -> relu
//!   -> pred (num_classes) -> softmax
//! ```

use ndarray::{Array2, Array4, ArrayD, ArrayView1, ArrayView2, ArrayView4, Ix1, Ix2, Ix4, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::layers::{
    conv2d, conv2d_backward, linear, linear_backward, max_pool2d, max_pool2d_backward, relu,
    relu_backward, softmax,
};
use super::{ForwardPass, Model, Parameters};
use crate::data::Batch;
use crate::{Error, Result};

/// Architecture hyperparameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeNetConfig {
    pub in_channels: usize,
    pub height: usize,
    pub width: usize,
    pub num_classes: usize,
    pub conv1_channels: usize,
    pub conv2_channels: usize,
    /// Width of the hidden fully connected layer
    pub hidden: usize,
    /// Square convolution kernel size
    pub kernel: usize,
    /// Square pooling window, also used as its stride
    pub pool: usize,
}

impl Default for LeNetConfig {
    fn default() -> Self {
        Self {
            in_channels: 1,
            height: 28,
            width: 28,
            num_classes: 10,
            conv1_channels: 20,
            conv2_channels: 50,
            hidden: 500,
            kernel: 5,
            pool: 2,
        }
    }
}

/// Spatial sizes after each stage
#[derive(Debug, Clone, Copy)]
struct FeatureDims {
    conv1: [usize; 3],
    pool1: [usize; 3],
    conv2: [usize; 3],
    pool2: [usize; 3],
    flat: usize,
}

/// One row of [`LeNet::describe`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    /// Per-example output shape
    pub output_shape: Vec<usize>,
    pub num_params: usize,
}

impl LeNetConfig {
    pub fn with_input(mut self, channels: usize, height: usize, width: usize) -> Self {
        self.in_channels = channels;
        self.height = height;
        self.width = width;
        self
    }

    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    pub fn with_conv_channels(mut self, conv1: usize, conv2: usize) -> Self {
        self.conv1_channels = conv1;
        self.conv2_channels = conv2;
        self
    }

    pub fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_kernel(mut self, kernel: usize) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_pool(mut self, pool: usize) -> Self {
        self.pool = pool;
        self
    }

    /// Image shape `[channels, height, width]`
    pub fn input_shape(&self) -> [usize; 3] {
        [self.in_channels, self.height, self.width]
    }

    /// Check the configuration yields a non-empty feature map at every stage
    pub fn validate(&self) -> Result<()> {
        self.feature_dims().map(|_| ())
    }

    fn feature_dims(&self) -> Result<FeatureDims> {
        let sizes = [
            ("in_channels", self.in_channels),
            ("height", self.height),
            ("width", self.width),
            ("num_classes", self.num_classes),
            ("conv1_channels", self.conv1_channels),
            ("conv2_channels", self.conv2_channels),
            ("hidden", self.hidden),
            ("kernel", self.kernel),
            ("pool", self.pool),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(Error::ConfigError(format!("model.{name} must be > 0")));
        }

        let (k, p) = (self.kernel, self.pool);
        let conv = |len: usize, stage: &str| {
            len.checked_sub(k).map(|d| d + 1).ok_or_else(|| {
                Error::ConfigError(format!("{stage} input {len} smaller than kernel {k}"))
            })
        };
        let pool = |len: usize, stage: &str| {
            len.checked_sub(p).map(|d| d / p + 1).ok_or_else(|| {
                Error::ConfigError(format!("{stage} input {len} smaller than pool {p}"))
            })
        };

        let conv1 = [self.conv1_channels, conv(self.height, "conv1")?, conv(self.width, "conv1")?];
        let pool1 = [self.conv1_channels, pool(conv1[1], "pool1")?, pool(conv1[2], "pool1")?];
        let conv2 = [self.conv2_channels, conv(pool1[1], "conv2")?, conv(pool1[2], "conv2")?];
        let pool2 = [self.conv2_channels, pool(conv2[1], "pool2")?, pool(conv2[2], "pool2")?];

        Ok(FeatureDims {
            conv1,
            pool1,
            conv2,
            pool2,
            flat: pool2.iter().product(),
        })
    }

    /// Parameter names and shapes, in layer order
    pub fn parameter_shapes(&self) -> Result<Vec<(&'static str, Vec<usize>)>> {
        let dims = self.feature_dims()?;
        let k = self.kernel;
        Ok(vec![
            ("conv1_w", vec![self.conv1_channels, self.in_channels, k, k]),
            ("conv1_b", vec![self.conv1_channels]),
            ("conv2_w", vec![self.conv2_channels, self.conv1_channels, k, k]),
            ("conv2_b", vec![self.conv2_channels]),
            ("fc3_w", vec![self.hidden, dims.flat]),
            ("fc3_b", vec![self.hidden]),
            ("pred_w", vec![self.num_classes, self.hidden]),
            ("pred_b", vec![self.num_classes]),
        ])
    }

    /// Build a freshly initialized network
    ///
    /// Weights are drawn from `U(-sqrt(3 / fan_in), sqrt(3 / fan_in))`, biases
    /// start at zero.
    pub fn init(self, seed: u64) -> Result<LeNet> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut params = Parameters::new();

        for (name, shape) in self.parameter_shapes()? {
            let tensor = if name.ends_with("_b") {
                ArrayD::zeros(IxDyn(&shape))
            } else {
                let fan_in = shape.iter().product::<usize>() / shape[0];
                let scale = (3.0 / fan_in as f32).sqrt();
                ArrayD::from_shape_fn(IxDyn(&shape), |_| rng.random_range(-scale..scale))
            };
            params.insert(name, tensor);
        }

        Ok(LeNet {
            config: self,
            params,
        })
    }
}

/// Intermediate values kept for the backward pass
struct Activations {
    conv1: Array4<f32>,
    pool1: Array4<f32>,
    conv2: Array4<f32>,
    pool2_dim: (usize, usize, usize, usize),
    flat: Array2<f32>,
    hidden_pre: Array2<f32>,
    hidden: Array2<f32>,
    probs: Array2<f32>,
}

/// LeNet classifier
#[derive(Debug, Clone)]
pub struct LeNet {
    config: LeNetConfig,
    params: Parameters,
}

impl LeNet {
    /// Rebuild a network from saved parameters
    ///
    /// Names and shapes must match `config` exactly.
    pub fn from_parameters(config: LeNetConfig, params: Parameters) -> Result<Self> {
        let mut expected = Parameters::new();
        for (name, shape) in config.parameter_shapes()? {
            expected.insert(name, ArrayD::zeros(IxDyn(&shape)));
        }
        expected.check_compatible(&params)?;
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &LeNetConfig {
        &self.config
    }

    /// Per-layer output shapes and parameter counts
    pub fn describe(&self) -> Result<Vec<LayerSummary>> {
        let dims = self.config.feature_dims()?;
        let count = |names: &[&str]| -> usize {
            names
                .iter()
                .filter_map(|n| self.params.get(n))
                .map(|t| t.len())
                .sum()
        };
        let layer = |name: &str, output_shape: Vec<usize>, num_params: usize| LayerSummary {
            name: name.to_string(),
            output_shape,
            num_params,
        };

        Ok(vec![
            layer("conv1", dims.conv1.to_vec(), count(&["conv1_w", "conv1_b"])),
            layer("pool1", dims.pool1.to_vec(), 0),
            layer("conv2", dims.conv2.to_vec(), count(&["conv2_w", "conv2_b"])),
            layer("pool2", dims.pool2.to_vec(), 0),
            layer("fc3", vec![self.config.hidden], count(&["fc3_w", "fc3_b"])),
            layer("relu3", vec![self.config.hidden], 0),
            layer("pred", vec![self.config.num_classes], count(&["pred_w", "pred_b"])),
            layer("softmax", vec![self.config.num_classes], 0),
        ])
    }

    fn weight4(&self, name: &str) -> Result<ArrayView4<'_, f32>> {
        Ok(self.params.require(name)?.view().into_dimensionality::<Ix4>()?)
    }

    fn weight2(&self, name: &str) -> Result<ArrayView2<'_, f32>> {
        Ok(self.params.require(name)?.view().into_dimensionality::<Ix2>()?)
    }

    fn bias(&self, name: &str) -> Result<ArrayView1<'_, f32>> {
        Ok(self.params.require(name)?.view().into_dimensionality::<Ix1>()?)
    }

    fn check_input(&self, images: &Array4<f32>) -> Result<()> {
        let (_, c, h, w) = images.dim();
        let expected = self.config.input_shape();
        if [c, h, w] != expected {
            return Err(Error::shape_mismatch("model input", expected, [c, h, w]));
        }
        Ok(())
    }

    fn activations(&self, images: &Array4<f32>) -> Result<Activations> {
        self.check_input(images)?;
        let p = self.config.pool;

        let conv1 = conv2d(images.view(), self.weight4("conv1_w")?, self.bias("conv1_b")?)?;
        let pool1 = max_pool2d(&conv1, p, p)?;
        let conv2 = conv2d(pool1.view(), self.weight4("conv2_w")?, self.bias("conv2_b")?)?;
        let pool2 = max_pool2d(&conv2, p, p)?;

        let pool2_dim = pool2.dim();
        let (n, c, h, w) = pool2_dim;
        let flat = pool2.into_shape_with_order((n, c * h * w))?;

        let hidden_pre = linear(&flat, self.weight2("fc3_w")?, self.bias("fc3_b")?)?;
        let hidden = relu(&hidden_pre);
        let logits = linear(&hidden, self.weight2("pred_w")?, self.bias("pred_b")?)?;

        Ok(Activations {
            conv1,
            pool1,
            conv2,
            pool2_dim,
            flat,
            hidden_pre,
            hidden,
            probs: softmax(&logits),
        })
    }
}

impl Model for LeNet {
    fn forward(&self, images: &Array4<f32>) -> Result<Array2<f32>> {
        Ok(self.activations(images)?.probs)
    }

    fn backward(&self, batch: &Batch) -> Result<ForwardPass> {
        let num_classes = self.config.num_classes;
        if let Some(&label) = batch.labels.iter().find(|&&l| l >= num_classes) {
            return Err(Error::InvalidLabel { label, num_classes });
        }

        let acts = self.activations(&batch.images)?;
        let p = self.config.pool;
        let n = batch.size().max(1) as f32;

        // d(mean cross-entropy)/d(logits) = (softmax - onehot) / N
        let mut grad_logits = acts.probs.clone();
        for (row, &label) in batch.labels.iter().enumerate() {
            grad_logits[[row, label]] -= 1.0;
        }
        grad_logits.mapv_inplace(|v| v / n);

        let pred = linear_backward(&acts.hidden, self.weight2("pred_w")?, &grad_logits);
        let grad_hidden = relu_backward(&acts.hidden_pre, &pred.input);
        let fc3 = linear_backward(&acts.flat, self.weight2("fc3_w")?, &grad_hidden);

        let grad_pool2 = fc3.input.to_shape(acts.pool2_dim)?.into_owned();
        let grad_conv2 = max_pool2d_backward(&acts.conv2, &grad_pool2, p, p)?;
        let conv2 = conv2d_backward(acts.pool1.view(), self.weight4("conv2_w")?, &grad_conv2, true)?;

        let grad_pool1 = conv2
            .input
            .unwrap_or_else(|| Array4::zeros(acts.pool1.raw_dim()));
        let grad_conv1 = max_pool2d_backward(&acts.conv1, &grad_pool1, p, p)?;
        let conv1 = conv2d_backward(batch.images.view(), self.weight4("conv1_w")?, &grad_conv1, false)?;

        let mut gradients = Parameters::new();
        gradients.insert("conv1_w", conv1.weight.into_dyn());
        gradients.insert("conv1_b", conv1.bias.into_dyn());
        gradients.insert("conv2_w", conv2.weight.into_dyn());
        gradients.insert("conv2_b", conv2.bias.into_dyn());
        gradients.insert("fc3_w", fc3.weight.into_dyn());
        gradients.insert("fc3_b", fc3.bias.into_dyn());
        gradients.insert("pred_w", pred.weight.into_dyn());
        gradients.insert("pred_b", pred.bias.into_dyn());

        Ok(ForwardPass {
            predictions: acts.probs,
            gradients,
        })
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn input_shape(&self) -> [usize; 3] {
        self.config.input_shape()
    }

    fn name(&self) -> &str {
        "lenet"
    }
}
