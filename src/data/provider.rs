//! Batch providers over named splits

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::batch::Batch;
use super::record::DigitRecord;
use super::store::DigitStore;
use crate::{Error, Result};

/// Dataset split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Test => write!(f, "test"),
        }
    }
}

/// Source of batches for the trainer
///
/// Implementations cycle through their examples: once a split is exhausted
/// reading restarts from its first record.
pub trait DatasetProvider {
    /// Next `batch_size` examples of `split`, advancing that split's cursor
    fn next_batch(&mut self, split: Split, batch_size: usize) -> Result<Batch>;

    /// Number of examples available in `split`
    fn len(&self, split: Split) -> Result<usize>;

    /// Image shape `[channels, height, width]` of `split`
    fn image_shape(&self, split: Split) -> Result<[usize; 3]>;
}

/// Random access to stored records
pub trait RecordSource {
    /// Number of records
    fn len(&self) -> usize;

    /// Image shape of every record
    fn shape(&self) -> [usize; 3];

    /// Record at `index` (`index < len()`)
    fn record(&self, index: usize) -> Result<DigitRecord>;
}

impl RecordSource for DigitStore {
    fn len(&self) -> usize {
        DigitStore::len(self)
    }

    fn shape(&self) -> [usize; 3] {
        DigitStore::shape(self)
    }

    fn record(&self, index: usize) -> Result<DigitRecord> {
        self.get(index)
    }
}

/// Records held in memory, used for synthetic data
#[derive(Clone, Debug)]
pub struct InMemorySource {
    shape: [usize; 3],
    records: Vec<DigitRecord>,
}

impl InMemorySource {
    /// Create a source, checking every record has `shape`
    pub fn new(shape: [usize; 3], records: Vec<DigitRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.shape() != shape) {
            return Err(Error::shape_mismatch("in-memory record", shape, bad.shape()));
        }
        Ok(Self { shape, records })
    }
}

impl RecordSource for InMemorySource {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn shape(&self) -> [usize; 3] {
        self.shape
    }

    fn record(&self, index: usize) -> Result<DigitRecord> {
        self.records
            .get(index)
            .cloned()
            .ok_or_else(|| Error::DataUnavailable(format!("record {index} out of range")))
    }
}

struct SplitCursor {
    source: Box<dyn RecordSource>,
    position: usize,
}

/// [`DatasetProvider`] keeping one read cursor per split
#[derive(Default)]
pub struct SplitProvider {
    splits: HashMap<Split, SplitCursor>,
}

impl SplitProvider {
    /// Create a provider with no splits
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a record source to `split`, replacing any previous one
    pub fn with_source(mut self, split: Split, source: impl RecordSource + 'static) -> Self {
        self.splits.insert(
            split,
            SplitCursor {
                source: Box::new(source),
                position: 0,
            },
        );
        self
    }

    /// Open train and test [`DigitStore`]s
    pub fn open_stores(train: impl AsRef<Path>, test: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new()
            .with_source(Split::Train, DigitStore::open(train)?)
            .with_source(Split::Test, DigitStore::open(test)?))
    }

    /// Current read position of `split`
    pub fn position(&self, split: Split) -> Option<usize> {
        self.splits.get(&split).map(|c| c.position)
    }

    fn cursor(&self, split: Split) -> Result<&SplitCursor> {
        self.splits
            .get(&split)
            .ok_or_else(|| Error::DataUnavailable(format!("no {split} split configured")))
    }
}

impl DatasetProvider for SplitProvider {
    fn next_batch(&mut self, split: Split, batch_size: usize) -> Result<Batch> {
        if batch_size == 0 {
            return Err(Error::ConfigError("batch size must be > 0".to_string()));
        }
        let cursor = self
            .splits
            .get_mut(&split)
            .ok_or_else(|| Error::DataUnavailable(format!("no {split} split configured")))?;

        let len = cursor.source.len();
        if len == 0 {
            return Err(Error::DataUnavailable(format!("{split} split is empty")));
        }

        let mut records = Vec::with_capacity(batch_size);
        for offset in 0..batch_size {
            records.push(cursor.source.record((cursor.position + offset) % len)?);
        }
        cursor.position = (cursor.position + batch_size) % len;
        debug!(%split, position = cursor.position, "Fetched batch");

        Batch::from_records(&records, cursor.source.shape())
    }

    fn len(&self, split: Split) -> Result<usize> {
        Ok(self.cursor(split)?.source.len())
    }

    fn image_shape(&self, split: Split) -> Result<[usize; 3]> {
        Ok(self.cursor(split)?.source.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(labels: &[u8]) -> InMemorySource {
        let records = labels
            .iter()
            .map(|&l| DigitRecord::new(l, [1, 1, 2], vec![l, l]).unwrap())
            .collect();
        InMemorySource::new([1, 1, 2], records).unwrap()
    }

    #[test]
    fn test_split_display() {
        assert_eq!(Split::Train.to_string(), "train");
        assert_eq!(Split::Test.to_string(), "test");
    }

    #[test]
    fn test_next_batch_cycles() {
        let mut provider = SplitProvider::new().with_source(Split::Train, source(&[0, 1, 2]));

        let first = provider.next_batch(Split::Train, 2).unwrap();
        assert_eq!(first.labels, vec![0, 1]);

        let second = provider.next_batch(Split::Train, 2).unwrap();
        assert_eq!(second.labels, vec![2, 0]);
        assert_eq!(provider.position(Split::Train), Some(1));
    }

    #[test]
    fn test_batch_larger_than_split_wraps() {
        let mut provider = SplitProvider::new().with_source(Split::Test, source(&[4, 5]));
        let batch = provider.next_batch(Split::Test, 5).unwrap();
        assert_eq!(batch.labels, vec![4, 5, 4, 5, 4]);
    }

    #[test]
    fn test_splits_have_independent_cursors() {
        let mut provider = SplitProvider::new()
            .with_source(Split::Train, source(&[0, 1]))
            .with_source(Split::Test, source(&[7, 8]));

        provider.next_batch(Split::Train, 1).unwrap();
        let test = provider.next_batch(Split::Test, 1).unwrap();
        assert_eq!(test.labels, vec![7]);
        assert_eq!(provider.position(Split::Train), Some(1));
    }

    #[test]
    fn test_missing_split_is_unavailable() {
        let mut provider = SplitProvider::new().with_source(Split::Train, source(&[0]));
        assert!(matches!(
            provider.next_batch(Split::Test, 1),
            Err(Error::DataUnavailable(_))
        ));
        assert!(provider.len(Split::Test).is_err());
    }

    #[test]
    fn test_empty_split_is_unavailable() {
        let mut provider = SplitProvider::new().with_source(Split::Train, source(&[]));
        assert!(matches!(
            provider.next_batch(Split::Train, 1),
            Err(Error::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut provider = SplitProvider::new().with_source(Split::Train, source(&[0]));
        assert!(matches!(
            provider.next_batch(Split::Train, 0),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_in_memory_source_checks_shape() {
        let records = vec![DigitRecord::new(0, [1, 2, 2], vec![0; 4]).unwrap()];
        assert!(InMemorySource::new([1, 1, 2], records).is_err());
    }

    #[test]
    fn test_open_stores_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SplitProvider::open_stores(dir.path().join("a"), dir.path().join("b"));
        assert!(matches!(result, Err(Error::DataUnavailable(_))));
    }
}
