use crate::types::AnalysisOutcome;
use std::fmt;

/// Text report formatter for an analysis outcome
pub struct TextReport<'a> {
    outcome: &'a AnalysisOutcome,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(outcome: &'a AnalysisOutcome) -> Self {
        Self { outcome }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            AnalysisOutcome::Prediction(prediction) => {
                writeln!(f, "Image Analysis")?;
                writeln!(f, "==============")?;
                writeln!(f)?;
                for (label, score) in prediction.iter() {
                    writeln!(f, "{:<14}{:.4}", format!("{}:", label), score)?;
                }
                writeln!(f)?;
                write!(f, "Top finding:  {}", prediction.top_label())
            }
            AnalysisOutcome::Error(error) => write!(f, "Error: {}", error),
        }
    }
}
