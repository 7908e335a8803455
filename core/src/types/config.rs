/// Default square side for raster inputs
pub const DEFAULT_TARGET_SIZE: u32 = 224;

/// How DICOM pixel arrays are sized before conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum DicomResize {
    /// Keep the stored rows x columns
    #[default]
    Native,
    /// Interpolate to `target_size x target_size`
    Resample,
}

/// Parameters of the synthetic placeholder volume
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntheticConfig {
    /// Volume size as (depth, height, width)
    pub dims: (usize, usize, usize),

    /// Number of spheres placed in the volume
    pub num_objects: usize,

    /// Smallest sphere radius in voxels
    pub rad_min: usize,

    /// Largest sphere radius in voxels
    pub rad_max: usize,

    /// Standard deviation of the additive Gaussian noise
    pub noise_std: f32,

    /// Largest translation per axis, in voxels
    pub max_translation: f32,

    /// Largest rotation per axis, in radians
    pub max_rotation: f32,

    /// Seed for reproducible volumes; entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            dims: (128, 128, 128),
            num_objects: 5,
            rad_min: 5,
            rad_max: 20,
            noise_std: 0.1,
            max_translation: 5.0,
            max_rotation: 0.1,
            seed: None,
        }
    }
}

/// Configuration of the image input normalizer
///
/// Replaces the separate "mock" and "DICOM" program variants with flags.
///
/// # Example
///
/// ```
/// use medimage_core::{DicomResize, NormalizerConfig};
///
/// let config = NormalizerConfig::default()
///     .with_target_size(256)
///     .with_dicom_resize(DicomResize::Resample)
///     .with_seed(7);
///
/// assert!(config.dicom_enabled);
/// assert_eq!(config.target_size, 256);
/// assert_eq!(config.synthetic.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizerConfig {
    /// Route `.dcm`/`.dicom` paths to the DICOM decoder
    pub dicom_enabled: bool,

    /// Square side used for raster resizing (and DICOM resampling)
    pub target_size: u32,

    /// DICOM sizing policy
    pub dicom_resize: DicomResize,

    /// Synthetic volume parameters
    pub synthetic: SyntheticConfig,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            dicom_enabled: true,
            target_size: DEFAULT_TARGET_SIZE,
            dicom_resize: DicomResize::Native,
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl NormalizerConfig {
    /// Configuration without DICOM support
    ///
    /// DICOM paths are treated like any other raster path.
    ///
    /// ```
    /// use medimage_core::NormalizerConfig;
    ///
    /// assert!(!NormalizerConfig::raster_only().dicom_enabled);
    /// ```
    pub fn raster_only() -> Self {
        Self {
            dicom_enabled: false,
            ..Self::default()
        }
    }

    /// Builder: enable or disable DICOM decoding
    pub fn with_dicom(mut self, enabled: bool) -> Self {
        self.dicom_enabled = enabled;
        self
    }

    /// Builder: set the square target size
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Builder: set the DICOM sizing policy
    pub fn with_dicom_resize(mut self, policy: DicomResize) -> Self {
        self.dicom_resize = policy;
        self
    }

    /// Builder: replace the synthetic volume parameters
    pub fn with_synthetic(mut self, synthetic: SyntheticConfig) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Builder: seed the synthetic generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.synthetic.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NormalizerConfig::default();
        assert!(config.dicom_enabled);
        assert_eq!(config.target_size, 224);
        assert_eq!(config.dicom_resize, DicomResize::Native);
        assert_eq!(config.synthetic.dims, (128, 128, 128));
        assert_eq!(config.synthetic.num_objects, 5);
        assert_eq!(config.synthetic.rad_max, 20);
        assert!(config.synthetic.seed.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = NormalizerConfig::raster_only()
            .with_dicom(true)
            .with_target_size(64)
            .with_synthetic(SyntheticConfig {
                dims: (8, 16, 16),
                ..SyntheticConfig::default()
            })
            .with_seed(3);
        assert!(config.dicom_enabled);
        assert_eq!(config.target_size, 64);
        assert_eq!(config.synthetic.dims, (8, 16, 16));
        assert_eq!(config.synthetic.seed, Some(3));
    }
}
