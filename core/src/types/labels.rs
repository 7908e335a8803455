use std::fmt;

/// Diagnostic finding reported by the chest image classifier
///
/// The variant order is the positional order of a classifier's raw
/// score vector. Do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticLabel {
    #[cfg_attr(feature = "json", serde(rename = "No Finding"))]
    NoFinding,
    Pneumonia,
    Effusion,
    Atelectasis,
    Cardiomegaly,
    Edema,
}

/// All diagnostic labels in score-vector order
pub const DIAGNOSTIC_LABELS: [DiagnosticLabel; 6] = [
    DiagnosticLabel::NoFinding,
    DiagnosticLabel::Pneumonia,
    DiagnosticLabel::Effusion,
    DiagnosticLabel::Atelectasis,
    DiagnosticLabel::Cardiomegaly,
    DiagnosticLabel::Edema,
];

impl DiagnosticLabel {
    /// Returns the display name used as the result key
    pub fn simple_name(&self) -> &'static str {
        match self {
            DiagnosticLabel::NoFinding => "No Finding",
            DiagnosticLabel::Pneumonia => "Pneumonia",
            DiagnosticLabel::Effusion => "Effusion",
            DiagnosticLabel::Atelectasis => "Atelectasis",
            DiagnosticLabel::Cardiomegaly => "Cardiomegaly",
            DiagnosticLabel::Edema => "Edema",
        }
    }

    /// Position of this label in a score vector
    pub fn index(&self) -> usize {
        match self {
            DiagnosticLabel::NoFinding => 0,
            DiagnosticLabel::Pneumonia => 1,
            DiagnosticLabel::Effusion => 2,
            DiagnosticLabel::Atelectasis => 3,
            DiagnosticLabel::Cardiomegaly => 4,
            DiagnosticLabel::Edema => 5,
        }
    }

    /// Parses a label from its display name (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = s.trim();
        DIAGNOSTIC_LABELS
            .iter()
            .copied()
            .find(|label| label.simple_name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for DiagnosticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
