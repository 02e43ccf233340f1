//! IDX file parsing and conversion into a [`DigitStore`]
//!
//! IDX files are big-endian: a magic number (`0x00000803` for images,
//! `0x00000801` for labels), the item count, then rows and columns for
//! images, followed by raw `u8` data.

use std::path::Path;

use tracing::info;

use super::record::DigitRecord;
use super::store::DigitStore;
use crate::{Error, Result};

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

/// Records are written in chunks so conversion memory stays bounded
const CONVERT_CHUNK: usize = 1024;

/// Decoded IDX image file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdxImages {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u8>,
}

impl IdxImages {
    /// Raw pixels of image `index`, `None` past the last image
    pub fn image(&self, index: usize) -> Option<&[u8]> {
        let size = self.rows * self.cols;
        let start = index.checked_mul(size)?;
        self.pixels.get(start..start.checked_add(size)?)
    }
}

/// Read a big-endian `u32` at `offset`
fn read_be_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| Error::DataUnavailable("IDX header truncated".to_string()))
}

/// Parse an IDX3 image file
pub fn parse_idx_images(data: &[u8]) -> Result<IdxImages> {
    let magic = read_be_u32(data, 0)?;
    if magic != IMAGES_MAGIC {
        return Err(Error::DataUnavailable(format!(
            "bad IDX image magic {magic:#010x}"
        )));
    }
    let count = read_be_u32(data, 4)? as usize;
    let rows = read_be_u32(data, 8)? as usize;
    let cols = read_be_u32(data, 12)? as usize;

    let body = &data[16..];
    let expected = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| {
            Error::DataUnavailable(format!("IDX image header {count}x{rows}x{cols} overflows"))
        })?;
    if body.len() < expected {
        return Err(Error::DataUnavailable(format!(
            "IDX image file truncated: {} of {expected} bytes",
            body.len()
        )));
    }

    Ok(IdxImages {
        count,
        rows,
        cols,
        pixels: body[..expected].to_vec(),
    })
}

/// Parse an IDX1 label file
pub fn parse_idx_labels(data: &[u8]) -> Result<Vec<u8>> {
    let magic = read_be_u32(data, 0)?;
    if magic != LABELS_MAGIC {
        return Err(Error::DataUnavailable(format!(
            "bad IDX label magic {magic:#010x}"
        )));
    }
    let count = read_be_u32(data, 4)? as usize;

    let body = &data[8..];
    if body.len() < count {
        return Err(Error::DataUnavailable(format!(
            "IDX label file truncated: {} of {count} labels",
            body.len()
        )));
    }
    Ok(body[..count].to_vec())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| Error::DataUnavailable(format!("cannot read {}: {e}", path.display())))
}

/// Convert an IDX image/label pair into a single-channel [`DigitStore`]
///
/// Returns the number of records written.
pub fn convert_idx_to_store(
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
    store_path: impl AsRef<Path>,
) -> Result<usize> {
    let images = parse_idx_images(&read_file(images_path.as_ref())?)?;
    let labels = parse_idx_labels(&read_file(labels_path.as_ref())?)?;

    if images.count != labels.len() {
        return Err(Error::DataUnavailable(format!(
            "{} images but {} labels",
            images.count,
            labels.len()
        )));
    }

    let shape = [1, images.rows, images.cols];
    let mut store = DigitStore::create(store_path.as_ref(), shape)?;

    let indices: Vec<usize> = (0..images.count).collect();
    for chunk in indices.chunks(CONVERT_CHUNK) {
        let records = chunk
            .iter()
            .map(|&i| {
                let pixels = images.image(i).ok_or_else(|| {
                    Error::DataUnavailable(format!("IDX image {i} out of range"))
                })?;
                DigitRecord::new(labels[i], shape, pixels.to_vec())
            })
            .collect::<Result<Vec<_>>>()?;
        store.append(records)?;
    }

    info!(
        store = %store_path.as_ref().display(),
        records = store.len(),
        "Converted IDX files"
    );
    Ok(store.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx_images(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        for word in [IMAGES_MAGIC, count, rows, cols] {
            data.extend_from_slice(&word.to_be_bytes());
        }
        data.extend_from_slice(pixels);
        data
    }

    fn idx_labels(labels: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        for word in [LABELS_MAGIC, labels.len() as u32] {
            data.extend_from_slice(&word.to_be_bytes());
        }
        data.extend_from_slice(labels);
        data
    }

    #[test]
    fn test_parse_images() {
        let data = idx_images(2, 2, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let images = parse_idx_images(&data).unwrap();

        assert_eq!((images.count, images.rows, images.cols), (2, 2, 3));
        assert_eq!(images.image(1), Some(&[7u8, 8, 9, 10, 11, 12][..]));
        assert_eq!(images.image(2), None);
    }

    #[test]
    fn test_parse_images_oversized_header() {
        let data = idx_images(u32::MAX, u32::MAX, u32::MAX, &[0; 4]);
        assert!(matches!(
            parse_idx_images(&data),
            Err(Error::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_images_bad_magic() {
        let mut data = idx_images(1, 1, 1, &[0]);
        data[3] = 0x01;
        assert!(matches!(
            parse_idx_images(&data),
            Err(Error::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_images_truncated() {
        let data = idx_images(2, 2, 2, &[0; 5]);
        assert!(parse_idx_images(&data).is_err());
        assert!(parse_idx_images(&data[..10]).is_err());
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(parse_idx_labels(&idx_labels(&[3, 1, 4])).unwrap(), vec![3, 1, 4]);

        let mut truncated = idx_labels(&[3, 1, 4]);
        truncated.pop();
        assert!(parse_idx_labels(&truncated).is_err());
    }

    #[test]
    fn test_convert_idx_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let images_path = dir.path().join("images-idx3-ubyte");
        let labels_path = dir.path().join("labels-idx1-ubyte");
        let store_path = dir.path().join("db").join("train.sqlite");

        let pixels: Vec<u8> = (0..12).collect();
        std::fs::write(&images_path, idx_images(3, 2, 2, &pixels)).unwrap();
        std::fs::write(&labels_path, idx_labels(&[5, 0, 9])).unwrap();

        let written = convert_idx_to_store(&images_path, &labels_path, &store_path).unwrap();
        assert_eq!(written, 3);

        let store = DigitStore::open(&store_path).unwrap();
        assert_eq!(store.shape(), [1, 2, 2]);
        let record = store.get(2).unwrap();
        assert_eq!(record.label, 9);
        assert_eq!(record.pixels, vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_convert_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let images_path = dir.path().join("i");
        let labels_path = dir.path().join("l");
        std::fs::write(&images_path, idx_images(2, 1, 1, &[0, 1])).unwrap();
        std::fs::write(&labels_path, idx_labels(&[1])).unwrap();

        let err = convert_idx_to_store(&images_path, &labels_path, dir.path().join("s")).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_idx_to_store(
            dir.path().join("missing-images"),
            dir.path().join("missing-labels"),
            dir.path().join("out.sqlite"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }
}
