use crate::classifier::{Classifier, MockClassifier};
use crate::error::Result;
use crate::normalizer::ImageNormalizer;
use crate::types::{
    AnalysisError, AnalysisOutcome, ImageTensor, NormalizerConfig, PredictionResult,
};
use log::{info, warn};
use std::path::Path;

/// Runs normalization and classification for one image
///
/// Failures never escape as `Err`: they come back as an
/// [`AnalysisOutcome::Error`] carrying the cause.
///
/// # Example
///
/// ```
/// use medimage_core::{Analyzer, NormalizerConfig};
/// use std::path::Path;
///
/// let analyzer = Analyzer::mock(NormalizerConfig::default());
/// let outcome = analyzer.analyze(Some(Path::new("does/not/exist.png")));
///
/// let error = outcome.error().unwrap();
/// assert!(error.error.starts_with("Failed to process the image:"));
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer<C> {
    normalizer: ImageNormalizer,
    classifier: C,
}

impl Analyzer<MockClassifier> {
    /// Analyzer backed by the constant placeholder classifier
    pub fn mock(config: NormalizerConfig) -> Self {
        Self::new(ImageNormalizer::new(config), MockClassifier)
    }
}

impl<C: Classifier> Analyzer<C> {
    pub fn new(normalizer: ImageNormalizer, classifier: C) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    pub fn normalizer(&self) -> &ImageNormalizer {
        &self.normalizer
    }

    /// Analyzes the image at `path`, or a synthetic image when `path` is `None`
    pub fn analyze(&self, path: Option<&Path>) -> AnalysisOutcome {
        match self.normalizer.normalize(path) {
            Ok(tensor) => self.predict(&tensor),
            Err(e) => {
                warn!("Image processing failed: {}", e);
                AnalysisError::new(format!("Failed to process the image: {}", e)).into()
            }
        }
    }

    /// Analyzes uploaded bytes; see [`ImageNormalizer::normalize_bytes`]
    pub fn analyze_bytes(&self, bytes: &[u8], name_hint: Option<&str>) -> AnalysisOutcome {
        match self.normalizer.normalize_bytes(bytes, name_hint) {
            Ok(tensor) => self.predict(&tensor),
            Err(e) => {
                warn!("Image processing failed: {}", e);
                AnalysisError::new(format!("Failed to process the image: {}", e)).into()
            }
        }
    }

    /// Classifies an already-normalized tensor
    pub fn predict(&self, tensor: &ImageTensor) -> AnalysisOutcome {
        match self.scores(tensor) {
            Ok(result) => {
                info!("Prediction for tensor {}: top label {}", tensor, result.top_label());
                result.into()
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                AnalysisError::new(format!("Failed to make a prediction: {}", e)).into()
            }
        }
    }

    fn scores(&self, tensor: &ImageTensor) -> Result<PredictionResult> {
        let raw = self.classifier.classify(tensor)?;
        PredictionResult::from_scores(&raw)
    }
}
