//! Checkpoint files
//!
//! A checkpoint is a JSON snapshot of the trainable parameters taken after a
//! completed iteration. Files are named `<prefix>_<iteration:05>.json` and are
//! written to a temporary file, synced and renamed into place, so a crash never
//! leaves a partial checkpoint under the final name.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::TrainConfig;
use crate::model::Parameters;
use crate::{Error, Result};

/// Snapshot of training state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Completed iteration count
    pub iteration: usize,
    /// Learning rate applied at the last completed iteration
    pub learning_rate: f32,
    /// Name of the model the parameters belong to
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub parameters: Parameters,
}

impl Checkpoint {
    pub fn new(
        iteration: usize,
        learning_rate: f32,
        model: impl Into<String>,
        parameters: Parameters,
    ) -> Self {
        Self {
            iteration,
            learning_rate,
            model: model.into(),
            created_at: Utc::now(),
            parameters,
        }
    }

    /// Write atomically to `path`, creating the parent directory
    ///
    /// Any failure is reported as [`Error::CheckpointWriteFailure`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_atomic(path)
            .map_err(|source| Error::CheckpointWriteFailure {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        let result = self.write_synced(&tmp).and_then(|()| fs::rename(&tmp, path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn write_synced(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self).map_err(io::Error::other)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    /// Read a checkpoint written by [`Checkpoint::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |reason: String| Error::CheckpointRead {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| read_error(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| read_error(e.to_string()))
    }
}

/// When and where checkpoints are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPolicy {
    dir: PathBuf,
    prefix: String,
    every: usize,
}

impl CheckpointPolicy {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, every: usize) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            every,
        }
    }

    pub fn from_config(config: &TrainConfig) -> Self {
        Self::new(
            &config.checkpoint_dir,
            &config.checkpoint_prefix,
            config.checkpoint_every,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a checkpoint is due once `completed` iterations have run
    pub fn is_due(&self, completed: usize) -> bool {
        self.every > 0 && completed > 0 && completed.is_multiple_of(self.every)
    }

    /// File for the checkpoint after `iteration` completed iterations
    pub fn path_for(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("{}_{iteration:05}.json", self.prefix))
    }

    /// Existing checkpoints in the directory, ordered by iteration
    pub fn existing(&self) -> Result<Vec<(usize, PathBuf)>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let marker = format!("{}_", self.prefix);
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let iteration = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(&marker))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<usize>().ok());
            if let Some(iteration) = iteration {
                found.push((iteration, path));
            }
        }
        found.sort();
        Ok(found)
    }

    /// Checkpoint with the highest iteration, if any
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        Ok(self.existing()?.pop().map(|(_, path)| path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn params() -> Parameters {
        let mut p = Parameters::new();
        p.insert("w", ArrayD::from_elem(IxDyn(&[2, 2]), 0.25));
        p.insert("b", ArrayD::zeros(IxDyn(&[2])));
        p
    }

    #[test]
    fn test_path_naming() {
        let policy = CheckpointPolicy::new("/ckpt", "mnist_lenet_checkpoint", 20);
        assert_eq!(
            policy.path_for(20),
            PathBuf::from("/ckpt/mnist_lenet_checkpoint_00020.json")
        );
        assert_eq!(
            policy.path_for(123456),
            PathBuf::from("/ckpt/mnist_lenet_checkpoint_123456.json")
        );
    }

    #[test]
    fn test_is_due() {
        let policy = CheckpointPolicy::new("c", "p", 2);
        let due: Vec<usize> = (0..=5).filter(|&i| policy.is_due(i)).collect();
        assert_eq!(due, vec![2, 4]);

        let disabled = CheckpointPolicy::new("c", "p", 0);
        assert!(!disabled.is_due(10));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ckpt_00002.json");

        let checkpoint = Checkpoint::new(2, 0.0999, "lenet", params());
        checkpoint.save(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(Checkpoint::load(&path).unwrap(), checkpoint);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = Checkpoint::new(1, 0.1, "lenet", params())
            .save(blocker.join("ckpt_00001.json"))
            .unwrap_err();
        assert!(matches!(err, Error::CheckpointWriteFailure { .. }));
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Checkpoint::load(&missing),
            Err(Error::CheckpointRead { .. })
        ));

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, b"{\"iteration\": 3").unwrap();
        assert!(matches!(
            Checkpoint::load(&corrupt),
            Err(Error::CheckpointRead { .. })
        ));
    }

    #[test]
    fn test_existing_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let policy = CheckpointPolicy::new(dir.path(), "run", 10);
        assert_eq!(policy.latest().unwrap(), None);

        for iteration in [20, 10, 100] {
            Checkpoint::new(iteration, 0.1, "lenet", params())
                .save(policy.path_for(iteration))
                .unwrap();
        }
        std::fs::write(dir.path().join("run_notes.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("other_00500.json"), b"{}").unwrap();

        let iterations: Vec<usize> = policy.existing().unwrap().iter().map(|(i, _)| *i).collect();
        assert_eq!(iterations, vec![10, 20, 100]);
        assert_eq!(policy.latest().unwrap(), Some(policy.path_for(100)));
    }
}
