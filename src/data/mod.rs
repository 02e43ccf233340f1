//! Digit data: stored records, IDX conversion and batch providers
//!
//! Examples live in a SQLite key-value store (one file per split) prepared
//! from the raw IDX files by [`convert_idx_to_store`]. Training code reads them
//! through the [`DatasetProvider`] trait, which hands out fixed-size batches and
//! wraps around at the end of a split.

mod batch;
mod idx;
mod provider;
mod record;
mod store;

pub use batch::{Batch, PIXEL_SCALE};
pub use idx::{convert_idx_to_store, parse_idx_images, parse_idx_labels, IdxImages};
pub use provider::{DatasetProvider, InMemorySource, RecordSource, Split, SplitProvider};
pub use record::DigitRecord;
pub use store::DigitStore;
