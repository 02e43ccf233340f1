//! Named parameter tensors

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ordered mapping from parameter name to tensor
///
/// Used both for a model's trainable weights and for their gradients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    tensors: BTreeMap<String, ArrayD<f32>>,
}

impl Parameters {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tensor
    pub fn insert(&mut self, name: impl Into<String>, tensor: ArrayD<f32>) {
        self.tensors.insert(name.into(), tensor);
    }

    /// Tensor named `name`, if present
    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.tensors.get(name)
    }

    /// Mutable tensor named `name`, if present
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArrayD<f32>> {
        self.tensors.get_mut(name)
    }

    /// Tensor named `name`, or [`Error::MissingParameter`]
    pub fn require(&self, name: &str) -> Result<&ArrayD<f32>> {
        self.get(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<f32>)> {
        self.tensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate mutably in name order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ArrayD<f32>)> {
        self.tensors.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameter names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// Number of tensors
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Total number of scalar values
    pub fn num_elements(&self) -> usize {
        self.tensors.values().map(|t| t.len()).sum()
    }

    /// Same names and shapes, all zeros
    pub fn zeros_like(&self) -> Self {
        Self {
            tensors: self
                .tensors
                .iter()
                .map(|(k, v)| (k.clone(), ArrayD::zeros(IxDyn(v.shape()))))
                .collect(),
        }
    }

    /// Check that `other` has exactly the same names and shapes
    pub fn check_compatible(&self, other: &Parameters) -> Result<()> {
        for name in self.names() {
            if other.get(name).is_none() {
                return Err(Error::MissingParameter(name.to_string()));
            }
        }
        for (name, tensor) in other.iter() {
            let own = self
                .get(name)
                .ok_or_else(|| Error::MissingParameter(name.to_string()))?;
            if own.shape() != tensor.shape() {
                return Err(Error::shape_mismatch(
                    format!("parameter {name}"),
                    own.shape(),
                    tensor.shape(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Parameters {
        let mut params = Parameters::new();
        params.insert("w", ArrayD::from_elem(IxDyn(&[2, 3]), 1.0));
        params.insert("b", ArrayD::from_elem(IxDyn(&[2]), 0.5));
        params
    }

    #[test]
    fn test_names_are_ordered() {
        let params = sample();
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["b", "w"]);
        assert_eq!(params.len(), 2);
        assert_eq!(params.num_elements(), 8);
    }

    #[test]
    fn test_require_missing() {
        let params = sample();
        assert!(params.require("w").is_ok());
        assert!(matches!(
            params.require("nope"),
            Err(Error::MissingParameter(_))
        ));
    }

    #[test]
    fn test_zeros_like() {
        let zeros = sample().zeros_like();
        assert_eq!(zeros.get("w").unwrap().shape(), &[2, 3]);
        assert!(zeros.iter().all(|(_, t)| t.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_check_compatible() {
        let params = sample();
        assert!(params.check_compatible(&params.zeros_like()).is_ok());

        let mut reshaped = sample();
        reshaped.insert("w", ArrayD::zeros(IxDyn(&[3, 2])));
        assert!(matches!(
            params.check_compatible(&reshaped),
            Err(Error::ShapeMismatch { .. })
        ));

        let mut extra = sample();
        extra.insert("z", ArrayD::zeros(IxDyn(&[1])));
        assert!(params.check_compatible(&extra).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let params = sample();
        let json = serde_json::to_string(&params).unwrap();
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
