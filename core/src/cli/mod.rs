pub mod report;

use crate::types::{DicomResize, NormalizerConfig, DEFAULT_TARGET_SIZE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for medimage
#[derive(Parser, Debug)]
#[command(name = "medimage")]
#[command(about = "Normalize a medical image and report diagnostic scores")]
#[command(version)]
pub struct Cli {
    /// Path to a DICOM, JPEG or PNG image
    #[arg(value_name = "FILE", required_unless_present = "synthetic")]
    pub file: Option<PathBuf>,

    /// Analyze a generated placeholder image instead of a file
    #[arg(long, conflicts_with = "file")]
    pub synthetic: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Treat .dcm files as raster images
    #[arg(long)]
    pub no_dicom: bool,

    /// Resample DICOM frames to the target size instead of keeping their resolution
    #[arg(long)]
    pub resample_dicom: bool,

    /// Square side for resized images
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE)]
    pub size: u32,

    /// Seed for the synthetic image
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Rejects a file argument that does not name an existing file
    pub fn check_input(&self) -> Result<(), String> {
        match &self.file {
            Some(path) if !path.is_file() => Err(format!(
                "{} does not exist or is not a file",
                path.display()
            )),
            _ => Ok(()),
        }
    }

    /// Builds the normalizer configuration from the flags
    pub fn normalizer_config(&self) -> NormalizerConfig {
        let mut config = NormalizerConfig::default()
            .with_dicom(!self.no_dicom)
            .with_target_size(self.size)
            .with_dicom_resize(if self.resample_dicom {
                DicomResize::Resample
            } else {
                DicomResize::Native
            });
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
