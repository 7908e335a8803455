pub mod analysis;
#[cfg(feature = "server")]
pub mod api;
pub mod classifier;
pub mod cli;
pub mod decode;
pub mod error;
pub mod normalizer;
pub mod services;
#[cfg(feature = "store")]
pub mod store;
pub mod types;

pub use analysis::Analyzer;
pub use classifier::{Classifier, MockClassifier, MOCK_SCORES};
pub use cli::report::TextReport;
pub use error::{MedImageError, Result};
pub use normalizer::ImageNormalizer;
pub use types::*;
