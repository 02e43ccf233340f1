//! Stored digit record and its binary value layout
//!
//! Layout: four little-endian `u32` (label, channels, height, width) followed
//! by `channels * height * width` raw pixels in channel-first order.

use crate::{Error, Result};

const HEADER_LEN: usize = 16;

/// One labelled image as kept in the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitRecord {
    pub label: u8,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub pixels: Vec<u8>,
}

impl DigitRecord {
    /// Create a record, checking the pixel count against the shape
    pub fn new(label: u8, shape: [usize; 3], pixels: Vec<u8>) -> Result<Self> {
        let [channels, height, width] = shape;
        if pixels.len() != channels * height * width {
            return Err(Error::shape_mismatch(
                "record pixels",
                [channels * height * width],
                [pixels.len()],
            ));
        }
        Ok(Self {
            label,
            channels,
            height,
            width,
            pixels,
        })
    }

    /// `[channels, height, width]`
    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    /// Serialize into the stored value layout
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.pixels.len());
        for field in [
            u32::from(self.label),
            self.channels as u32,
            self.height as u32,
            self.width as u32,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&self.pixels);
        out
    }

    /// Parse a stored value; any inconsistency means the store is corrupt
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::DataUnavailable(format!(
                "corrupt record: {} bytes, header needs {HEADER_LEN}",
                bytes.len()
            )));
        }

        let field = |i: usize| {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            u32::from_le_bytes(word) as usize
        };
        let (label, channels, height, width) = (field(0), field(1), field(2), field(3));

        let label = u8::try_from(label)
            .map_err(|_| Error::DataUnavailable(format!("corrupt record: label {label}")))?;
        let expected = channels
            .checked_mul(height)
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| {
                Error::DataUnavailable(format!(
                    "corrupt record: shape {channels}x{height}x{width} overflows"
                ))
            })?;
        let pixels = &bytes[HEADER_LEN..];
        if pixels.len() != expected {
            return Err(Error::DataUnavailable(format!(
                "corrupt record: {} pixels for shape {channels}x{height}x{width}",
                pixels.len()
            )));
        }

        Ok(Self {
            label,
            channels,
            height,
            width,
            pixels: pixels.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let record = DigitRecord::new(9, [1, 2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        let decoded = DigitRecord::decode(&record.encode()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_record_pixel_count_checked() {
        assert!(DigitRecord::new(0, [1, 2, 2], vec![0; 3]).is_err());
    }

    #[test]
    fn test_decode_truncated_header() {
        let err = DigitRecord::decode(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_decode_truncated_pixels() {
        let record = DigitRecord::new(1, [1, 2, 2], vec![9; 4]).unwrap();
        let mut bytes = record.encode();
        bytes.pop();
        let err = DigitRecord::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_decode_oversized_shape() {
        let mut bytes = Vec::new();
        for word in [1, u32::MAX, u32::MAX, u32::MAX] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let err = DigitRecord::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_decode_label_out_of_range() {
        let mut bytes = DigitRecord::new(1, [1, 1, 1], vec![0]).unwrap().encode();
        bytes[1] = 1; // label = 257
        assert!(DigitRecord::decode(&bytes).is_err());
    }
}
