//! Loss functions for training
//!
//! - [`CrossEntropyLoss`] - mean label cross-entropy over class probabilities

mod cross_entropy;
mod traits;

pub use cross_entropy::CrossEntropyLoss;
pub use traits::LossFn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_names() {
        assert_eq!(CrossEntropyLoss.name(), "CrossEntropy");
    }
}
