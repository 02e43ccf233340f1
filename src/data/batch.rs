//! Batch data structure

use ndarray::{Array4, Axis};

use super::record::DigitRecord;
use crate::{Error, Result};

/// Multiplier applied to raw `u8` pixels (maps 0..=255 into [0, 1))
pub const PIXEL_SCALE: f32 = 1.0 / 256.0;

/// A batch of labelled images
#[derive(Clone, Debug)]
pub struct Batch {
    /// Images, `[batch, channels, height, width]`, values in [0, 1]
    pub images: Array4<f32>,
    /// Class index per image
    pub labels: Vec<usize>,
}

impl Batch {
    /// Create a new batch, checking the image count and pixel range
    pub fn new(images: Array4<f32>, labels: Vec<usize>) -> Result<Self> {
        if images.len_of(Axis(0)) != labels.len() {
            return Err(Error::shape_mismatch(
                "batch labels",
                [images.len_of(Axis(0))],
                [labels.len()],
            ));
        }
        if let Some(v) = images.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::DataUnavailable(format!(
                "pixel value {v} outside [0, 1]"
            )));
        }
        Ok(Self { images, labels })
    }

    /// Assemble a batch from stored records, scaling pixels by [`PIXEL_SCALE`]
    pub fn from_records(records: &[DigitRecord], shape: [usize; 3]) -> Result<Self> {
        let [c, h, w] = shape;
        let mut pixels = Vec::with_capacity(records.len() * c * h * w);
        let mut labels = Vec::with_capacity(records.len());

        for record in records {
            if record.shape() != shape {
                return Err(Error::shape_mismatch("stored record", shape, record.shape()));
            }
            pixels.extend(record.pixels.iter().map(|&p| f32::from(p) * PIXEL_SCALE));
            labels.push(usize::from(record.label));
        }

        let images = Array4::from_shape_vec((records.len(), c, h, w), pixels)?;
        Ok(Self { images, labels })
    }

    /// Number of examples in the batch
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Per-image shape `[channels, height, width]`
    pub fn image_shape(&self) -> [usize; 3] {
        let (_, c, h, w) = self.images.dim();
        [c, h, w]
    }
}
