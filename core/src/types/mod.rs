//! Core type definitions
//!
//! - [`ImageTensor`]: normalized `f32` tensor handed to a classifier
//! - [`DiagnosticLabel`]: the fixed, ordered set of findings
//! - [`PredictionResult`], [`AnalysisError`], [`AnalysisOutcome`]: analysis results
//! - [`InputKind`]: which decoder an input goes through
//! - [`NormalizerConfig`]: normalizer configuration
//! - [`PhotometricInterpretation`]: DICOM pixel color model

mod config;
mod input_kind;
mod labels;
mod photometric;
mod prediction;
mod tensor;

pub use config::{DicomResize, NormalizerConfig, SyntheticConfig, DEFAULT_TARGET_SIZE};
pub use input_kind::{has_dicom_extension, InputKind, DICOM_EXTENSIONS};
pub use labels::{DiagnosticLabel, DIAGNOSTIC_LABELS};
pub use photometric::PhotometricInterpretation;
pub use prediction::{AnalysisError, AnalysisOutcome, PredictionResult};
pub use tensor::ImageTensor;
