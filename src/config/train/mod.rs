//! Single-command training from YAML configuration

mod loader;

pub use loader::{
    build_model, build_optimizer, load_checkpoint_model, load_config, open_provider,
    train_from_spec, train_from_yaml,
};
