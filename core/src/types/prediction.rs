use super::labels::{DiagnosticLabel, DIAGNOSTIC_LABELS};
use crate::error::{MedImageError, Result};
use std::fmt;

/// Scores for every diagnostic label
///
/// Always holds exactly one score per entry of [`DIAGNOSTIC_LABELS`],
/// in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    scores: [f32; DIAGNOSTIC_LABELS.len()],
}

impl PredictionResult {
    /// Aligns a raw score vector with the fixed label order
    ///
    /// # Errors
    ///
    /// Returns a prediction error if `scores` does not have one value per label
    pub fn from_scores(scores: &[f32]) -> Result<Self> {
        let scores: [f32; DIAGNOSTIC_LABELS.len()] = scores.try_into().map_err(|_| {
            MedImageError::Prediction(format!(
                "expected {} scores, classifier returned {}",
                DIAGNOSTIC_LABELS.len(),
                scores.len()
            ))
        })?;
        Ok(Self { scores })
    }

    /// Score for a single label
    pub fn get(&self, label: DiagnosticLabel) -> f32 {
        self.scores[label.index()]
    }

    /// Iterates (label, score) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (DiagnosticLabel, f32)> + '_ {
        DIAGNOSTIC_LABELS.iter().copied().zip(self.scores.iter().copied())
    }

    /// Label with the highest score; the first one wins ties
    pub fn top_label(&self) -> DiagnosticLabel {
        self.iter()
            .fold(None::<(DiagnosticLabel, f32)>, |best, (label, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((label, score)),
            })
            .map(|(label, _)| label)
            .unwrap_or(DiagnosticLabel::NoFinding)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for PredictionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, score) in self.iter() {
            map.serialize_entry(label.simple_name(), &score)?;
        }
        map.end()
    }
}

/// Error record returned in place of a [`PredictionResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisError {
    pub error: String,
}

impl AnalysisError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Result of analyzing one image: scores or an error, never both
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum AnalysisOutcome {
    Prediction(PredictionResult),
    Error(AnalysisError),
}

impl AnalysisOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Error(_))
    }

    /// Returns the scores, if the analysis succeeded
    pub fn prediction(&self) -> Option<&PredictionResult> {
        match self {
            AnalysisOutcome::Prediction(p) => Some(p),
            AnalysisOutcome::Error(_) => None,
        }
    }

    /// Returns the error record, if the analysis failed
    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            AnalysisOutcome::Prediction(_) => None,
            AnalysisOutcome::Error(e) => Some(e),
        }
    }
}

impl From<PredictionResult> for AnalysisOutcome {
    fn from(p: PredictionResult) -> Self {
        AnalysisOutcome::Prediction(p)
    }
}

impl From<AnalysisError> for AnalysisOutcome {
    fn from(e: AnalysisError) -> Self {
        AnalysisOutcome::Error(e)
    }
}
