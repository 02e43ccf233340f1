//! Evaluation metrics and the per-iteration metrics history

mod classification;
mod tracker;
mod trait_def;


pub use classification::{argmax_rows, Accuracy};
pub use tracker::MetricsTracker;
pub use trait_def::Metric;

pub(crate) use trait_def::check_targets;
