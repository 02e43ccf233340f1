//! YAML schema for a training run
//!
//! Every section has defaults, so a config only needs the store paths:
//!
//! ```yaml
//! data:
//!   train: tutorial_data/mnist/mnist-train-nchw.sqlite
//!   test: tutorial_data/mnist/mnist-test-nchw.sqlite
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::LeNetConfig;
use crate::train::{TrainConfig, DEFAULT_CHECKPOINT_PREFIX};

/// Complete run specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSpec {
    pub data: DataSpec,

    #[serde(default)]
    pub model: LeNetConfig,

    #[serde(default)]
    pub optimizer: OptimSpec,

    #[serde(default)]
    pub training: TrainingParams,
}

/// Dataset stores and batch sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Training split store
    pub train: PathBuf,

    /// Test split store
    pub test: PathBuf,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_test_batch_size")]
    pub test_batch_size: usize,
}

/// SGD with step-decayed learning rate
///
/// `lr(t) = base_lr * gamma^floor(t / step_size)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimSpec {
    #[serde(default = "default_base_lr")]
    pub base_lr: f32,

    #[serde(default = "default_gamma")]
    pub gamma: f32,

    #[serde(default = "default_step_size")]
    pub step_size: usize,

    #[serde(default)]
    pub momentum: f32,
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self {
            base_lr: default_base_lr(),
            gamma: default_gamma(),
            step_size: default_step_size(),
            momentum: 0.0,
        }
    }
}

/// Training loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// 0 disables checkpoints
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,

    #[serde(default = "default_test_iterations")]
    pub test_iterations: usize,

    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,

    #[serde(default = "default_checkpoint_prefix")]
    pub checkpoint_prefix: String,

    /// Seed for parameter initialization
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Log progress every N iterations; 0 disables
    #[serde(default = "default_log_every")]
    pub log_every: usize,

    /// Optional JSON file receiving the per-iteration history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<PathBuf>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            checkpoint_every: default_checkpoint_every(),
            test_iterations: default_test_iterations(),
            checkpoint_dir: default_checkpoint_dir(),
            checkpoint_prefix: default_checkpoint_prefix(),
            seed: default_seed(),
            log_every: default_log_every(),
            history: None,
        }
    }
}

impl HarnessSpec {
    /// Spec with default settings for the given stores
    pub fn new(train: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        Self {
            data: DataSpec {
                train: train.into(),
                test: test.into(),
                batch_size: default_batch_size(),
                test_batch_size: default_test_batch_size(),
            },
            model: LeNetConfig::default(),
            optimizer: OptimSpec::default(),
            training: TrainingParams::default(),
        }
    }

    /// Trainer settings described by this spec
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig::default()
            .with_iterations(self.training.iterations)
            .with_batch_size(self.data.batch_size)
            .with_checkpoint_every(self.training.checkpoint_every)
            .with_test(self.training.test_iterations, self.data.test_batch_size)
            .with_checkpoint_dir(&self.training.checkpoint_dir)
            .with_checkpoint_prefix(&self.training.checkpoint_prefix)
    }
}

fn default_batch_size() -> usize {
    64
}

fn default_test_batch_size() -> usize {
    100
}

fn default_base_lr() -> f32 {
    0.1
}

fn default_gamma() -> f32 {
    0.999
}

fn default_step_size() -> usize {
    1
}

fn default_iterations() -> usize {
    200
}

fn default_checkpoint_every() -> usize {
    20
}

fn default_test_iterations() -> usize {
    100
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_checkpoint_prefix() -> String {
    DEFAULT_CHECKPOINT_PREFIX.to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_log_every() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = "data:\n  train: train.sqlite\n  test: test.sqlite\n";
        let spec: HarnessSpec = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(spec, HarnessSpec::new("train.sqlite", "test.sqlite"));
        assert_eq!(spec.data.batch_size, 64);
        assert_eq!(spec.data.test_batch_size, 100);
        assert_eq!(spec.optimizer.base_lr, 0.1);
        assert_eq!(spec.optimizer.gamma, 0.999);
        assert_eq!(spec.training.iterations, 200);
        assert_eq!(spec.training.checkpoint_every, 20);
        assert_eq!(spec.model, LeNetConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
data:
  train: a.sqlite
  test: b.sqlite
  batch_size: 32
  test_batch_size: 50
model:
  hidden: 100
  num_classes: 2
optimizer:
  base_lr: 0.01
  gamma: 0.5
  step_size: 10
  momentum: 0.9
training:
  iterations: 40
  checkpoint_every: 0
  test_iterations: 5
  checkpoint_dir: out
  checkpoint_prefix: run
  seed: 7
  history: out/history.json
"#;
        let spec: HarnessSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.model.hidden, 100);
        assert_eq!(spec.model.conv1_channels, 20);
        assert_eq!(spec.optimizer.step_size, 10);
        assert_eq!(spec.optimizer.momentum, 0.9);
        assert_eq!(spec.training.seed, 7);
        assert_eq!(
            spec.training.history,
            Some(PathBuf::from("out/history.json"))
        );
    }

    #[test]
    fn test_missing_data_section_rejected() {
        let result: Result<HarnessSpec, _> = serde_yaml::from_str("training:\n  iterations: 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_train_config() {
        let mut spec = HarnessSpec::new("a", "b");
        spec.data.batch_size = 4;
        spec.training.iterations = 5;
        spec.training.checkpoint_every = 2;
        spec.training.checkpoint_prefix = "unit".into();

        let config = spec.train_config();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.checkpoint_every, 2);
        assert_eq!(config.test_batch_size, 100);
        assert_eq!(config.checkpoint_prefix, "unit");
        assert_eq!(config.checkpoint_dir, PathBuf::from("checkpoints"));
    }
}
