//! SQLite-backed key-value digit store
//!
//! One store holds one split. Records are keyed by the zero-padded example
//! index (`%08d`); the `meta` table carries the image shape and record count
//! so a truncated or half-written store is detected on open.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::record::DigitRecord;
use crate::{Error, Result};

/// Current schema version
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
";

/// Key for the record at `index`
fn record_key(index: usize) -> String {
    format!("{index:08}")
}

/// On-disk store of [`DigitRecord`]s for a single split
#[derive(Debug)]
pub struct DigitStore {
    conn: Connection,
    path: PathBuf,
    shape: [usize; 3],
    len: usize,
}

impl DigitStore {
    /// Create a new store, replacing any existing file at `path`
    pub fn create(path: impl AsRef<Path>, shape: [usize; 3]) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
            shape,
            len: 0,
        };
        store.write_meta()?;
        Ok(store)
    }

    /// Open an existing store read-only
    ///
    /// Fails with [`Error::DataUnavailable`] if the file is missing, is not a
    /// store, or its record count disagrees with its metadata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::DataUnavailable(format!(
                "store not found: {}",
                path.display()
            )));
        }

        let corrupt = |e: rusqlite::Error| {
            Error::DataUnavailable(format!("corrupt store {}: {e}", path.display()))
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(corrupt)?;

        let meta = |key: &str| -> Result<usize> {
            let value: Option<String> = conn
                .query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(corrupt)?;
            let value = value.ok_or_else(|| {
                Error::DataUnavailable(format!(
                    "corrupt store {}: missing meta '{key}'",
                    path.display()
                ))
            })?;
            value.parse().map_err(|_| {
                Error::DataUnavailable(format!(
                    "corrupt store {}: meta '{key}' = '{value}'",
                    path.display()
                ))
            })
        };

        let shape = [meta("channels")?, meta("height")?, meta("width")?];
        let len = meta("count")?;

        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(corrupt)?;
        if usize::try_from(stored).ok() != Some(len) {
            return Err(Error::DataUnavailable(format!(
                "corrupt store {}: meta count {len}, {stored} records",
                path.display()
            )));
        }

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            shape,
            len,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Image shape `[channels, height, width]` of every record
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append records in a single transaction, returning how many were written
    pub fn append<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = DigitRecord>,
    {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO records (key, value) VALUES (?1, ?2)")?;
            for record in records {
                if record.shape() != self.shape {
                    return Err(Error::shape_mismatch("store record", self.shape, record.shape()));
                }
                stmt.execute(params![record_key(self.len + written), record.encode()])?;
                written += 1;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('count', ?1)",
            [(self.len + written).to_string()],
        )?;
        tx.commit()?;

        self.len += written;
        Ok(written)
    }

    /// Read the record at `index`
    pub fn get(&self, index: usize) -> Result<DigitRecord> {
        let key = record_key(index);
        let corrupt = |e: rusqlite::Error| {
            Error::DataUnavailable(format!("corrupt store {}: {e}", self.path.display()))
        };

        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM records WHERE key = ?1")
            .map_err(corrupt)?;
        let value: Option<Vec<u8>> = stmt
            .query_row([&key], |row| row.get(0))
            .optional()
            .map_err(corrupt)?;

        let value = value.ok_or_else(|| {
            Error::DataUnavailable(format!(
                "record {key} missing from {}",
                self.path.display()
            ))
        })?;
        let record = DigitRecord::decode(&value)?;
        if record.shape() != self.shape {
            return Err(Error::DataUnavailable(format!(
                "corrupt store {}: record {key} has shape {:?}, store holds {:?}",
                self.path.display(),
                record.shape(),
                self.shape
            )));
        }
        Ok(record)
    }

    fn write_meta(&self) -> Result<()> {
        let [channels, height, width] = self.shape;
        for (key, value) in [
            ("schema_version", SCHEMA_VERSION.to_string()),
            ("channels", channels.to_string()),
            ("height", height.to_string()),
            ("width", width.to_string()),
            ("count", self.len.to_string()),
        ] {
            self.conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(label: u8) -> DigitRecord {
        DigitRecord::new(label, [1, 2, 2], vec![label; 4]).unwrap()
    }

    #[test]
    fn test_record_key_is_zero_padded() {
        assert_eq!(record_key(0), "00000000");
        assert_eq!(record_key(1234), "00001234");
    }

    #[test]
    fn test_create_append_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.sqlite");

        let mut store = DigitStore::create(&path, [1, 2, 2]).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.append((0..5).map(sample)).unwrap(), 5);
        assert_eq!(store.append([sample(7)]).unwrap(), 1);
        drop(store);

        let store = DigitStore::open(&path).unwrap();
        assert_eq!(store.len(), 6);
        assert_eq!(store.shape(), [1, 2, 2]);
        assert_eq!(store.get(3).unwrap(), sample(3));
        assert_eq!(store.get(5).unwrap(), sample(7));
    }

    #[test]
    fn test_open_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let err = DigitStore::open(dir.path().join("nope.sqlite")).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.sqlite");
        std::fs::write(&path, b"definitely not a database, just some bytes padding it out")
            .unwrap();

        let err = DigitStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_open_detects_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.sqlite");
        let mut store = DigitStore::create(&path, [1, 2, 2]).unwrap();
        store.append((0..3).map(sample)).unwrap();
        store
            .conn
            .execute("DELETE FROM records WHERE key = ?1", [record_key(1)])
            .unwrap();
        drop(store);

        let err = DigitStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_get_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.sqlite");
        let mut store = DigitStore::create(&path, [1, 2, 2]).unwrap();
        store.append([sample(1)]).unwrap();

        assert!(matches!(store.get(1), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_get_detects_record_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reshaped.sqlite");
        let mut store = DigitStore::create(&path, [1, 2, 2]).unwrap();
        store.append([sample(1), sample(2)]).unwrap();

        let flat = DigitRecord::new(2, [1, 1, 4], vec![2; 4]).unwrap();
        store
            .conn
            .execute(
                "UPDATE records SET value = ?1 WHERE key = ?2",
                params![flat.encode(), record_key(1)],
            )
            .unwrap();

        assert_eq!(store.get(0).unwrap(), sample(1));
        assert!(matches!(store.get(1), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_append_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DigitStore::create(dir.path().join("s.sqlite"), [1, 3, 3]).unwrap();
        let err = store.append([sample(1)]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
