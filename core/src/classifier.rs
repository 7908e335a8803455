use crate::error::Result;
use crate::types::{ImageTensor, DIAGNOSTIC_LABELS};
use std::sync::Arc;

/// Scores returned by [`MockClassifier`], one per diagnostic label
pub const MOCK_SCORES: [f32; DIAGNOSTIC_LABELS.len()] = [0.1, 0.2, 0.3, 0.1, 0.2, 0.1];

/// Image classifier producing one raw score per diagnostic label
///
/// Implementations must return scores in the order of
/// [`DIAGNOSTIC_LABELS`]. A vector of any other length is reported as a
/// prediction failure by the analyzer.
pub trait Classifier: Send + Sync {
    fn classify(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;
}

/// Placeholder classifier that ignores its input
#[derive(Debug, Clone, Copy, Default)]
pub struct MockClassifier;

impl Classifier for MockClassifier {
    fn classify(&self, _tensor: &ImageTensor) -> Result<Vec<f32>> {
        Ok(MOCK_SCORES.to_vec())
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        (**self).classify(tensor)
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn classify(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        (**self).classify(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_ignores_input() {
        let a = ImageTensor::from_shape_vec(&[1, 2, 2, 3], vec![0.0; 12]).unwrap();
        let b = ImageTensor::from_shape_vec(&[1, 4, 4], vec![1.0; 16]).unwrap();
        let mock = MockClassifier;
        assert_eq!(mock.classify(&a).unwrap(), MOCK_SCORES.to_vec());
        assert_eq!(mock.classify(&a).unwrap(), mock.classify(&b).unwrap());
    }

    #[test]
    fn test_boxed_classifier() {
        let boxed: Box<dyn Classifier> = Box::new(MockClassifier);
        let tensor = ImageTensor::from_shape_vec(&[1, 1, 1], vec![0.5]).unwrap();
        assert_eq!(boxed.classify(&tensor).unwrap().len(), DIAGNOSTIC_LABELS.len());
    }
}
