//! Per-iteration training history

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Loss, accuracy and learning rate per iteration, plus test accuracies
///
/// Serialized as JSON in place of loss/accuracy plots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTracker {
    /// Iteration index of the first recorded step (non-zero after a resume)
    pub first_iteration: usize,
    pub loss: Vec<f32>,
    pub accuracy: Vec<f32>,
    pub learning_rate: Vec<f32>,
    /// One entry per evaluation pass
    pub test_accuracy: Vec<f32>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording at `iteration`
    pub fn starting_at(iteration: usize) -> Self {
        Self {
            first_iteration: iteration,
            ..Self::default()
        }
    }

    /// Record one training iteration
    pub fn record_step(&mut self, loss: f32, accuracy: f32, learning_rate: f32) {
        self.loss.push(loss);
        self.accuracy.push(accuracy);
        self.learning_rate.push(learning_rate);
    }

    /// Record an evaluation pass
    pub fn record_test(&mut self, accuracy: f32) {
        self.test_accuracy.push(accuracy);
    }

    /// Number of recorded iterations
    pub fn steps(&self) -> usize {
        self.loss.len()
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.loss.last().copied()
    }

    /// Mean loss over the last `window` iterations
    pub fn mean_recent_loss(&self, window: usize) -> Option<f32> {
        let window = window.min(self.loss.len());
        if window == 0 {
            return None;
        }
        let recent = &self.loss[self.loss.len() - window..];
        Some(recent.iter().sum::<f32>() / window as f32)
    }

    /// Write the history as pretty JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(std::io::Error::other)?;
        Ok(())
    }
}
