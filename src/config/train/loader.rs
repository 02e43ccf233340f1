//! Entry points turning a [`HarnessSpec`] into a model, optimizer and run

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::schema::HarnessSpec;
use crate::config::validate::{validate_config, validate_settings};
use crate::data::{DigitStore, Split, SplitProvider};
use crate::model::{LeNet, Model};
use crate::optim::{StepDecayLR, SGD};
use crate::train::{Checkpoint, ProgressCallback, TrainResult, Trainer};
use crate::{Error, Result};

/// Load and parse a YAML configuration file
///
/// Range checks run here; store paths are checked when the stores are opened.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarnessSpec> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let spec: HarnessSpec = serde_yaml::from_str(&yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_settings(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}

/// Freshly initialized model for `spec`
pub fn build_model(spec: &HarnessSpec) -> Result<LeNet> {
    spec.model.clone().init(spec.training.seed)
}

/// SGD optimizer with the spec's step-decay schedule
pub fn build_optimizer(spec: &HarnessSpec) -> SGD {
    let optim = &spec.optimizer;
    SGD::new(
        StepDecayLR::new(optim.base_lr, optim.step_size, optim.gamma),
        optim.momentum,
    )
}

/// Model rebuilt from the parameters stored in a checkpoint
pub fn load_checkpoint_model(spec: &HarnessSpec, checkpoint: impl AsRef<Path>) -> Result<LeNet> {
    let checkpoint = Checkpoint::load(checkpoint)?;
    info!(
        iteration = checkpoint.iteration,
        model = %checkpoint.model,
        "Loaded checkpoint"
    );
    LeNet::from_parameters(spec.model.clone(), checkpoint.parameters)
}

/// Open the stores named by `spec`
///
/// The test store is only opened when evaluation is enabled.
pub fn open_provider(spec: &HarnessSpec) -> Result<SplitProvider> {
    let provider = SplitProvider::new().with_source(Split::Train, DigitStore::open(&spec.data.train)?);
    if spec.training.test_iterations == 0 {
        return Ok(provider);
    }
    Ok(provider.with_source(Split::Test, DigitStore::open(&spec.data.test)?))
}

/// Train a model from an already loaded spec
///
/// With `resume` the parameters and iteration count are restored from that
/// checkpoint and training continues up to `training.iterations`. The
/// history is written to `training.history` when set.
pub fn train_from_spec(spec: &HarnessSpec, resume: Option<&Path>) -> Result<TrainResult> {
    validate_config(spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;

    let mut provider = open_provider(spec)?;
    let model = build_model(spec)?;
    info!(
        model = model.name(),
        parameters = model.parameters().num_elements(),
        seed = spec.training.seed,
        "Built model"
    );

    let mut trainer = Trainer::new(model, build_optimizer(spec), spec.train_config());
    if spec.training.log_every > 0 {
        trainer.add_callback(ProgressCallback::new(spec.training.log_every));
    }
    if let Some(path) = resume {
        trainer.resume_from(&Checkpoint::load(path)?)?;
    }

    let result = trainer.run(&mut provider)?;

    if let Some(history) = &spec.training.history {
        result.history.save_json(history)?;
        info!(path = %history.display(), "Wrote training history");
    }
    Ok(result)
}

/// Train a model from a YAML configuration file
///
/// ```no_run
/// use lenet_harness::config::train_from_yaml;
///
/// let result = train_from_yaml("demos/lenet.yaml")?;
/// println!("test accuracy: {:.4}", result.evaluation.accuracy);
/// # Ok::<(), lenet_harness::Error>(())
/// ```
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<TrainResult> {
    let spec = load_config(config_path)?;
    train_from_spec(&spec, None)
}
