use crate::decode::{dicom, raster, synthetic};
use crate::error::{MedImageError, Result};
use crate::types::{DicomResize, ImageTensor, InputKind, NormalizerConfig};
use log::{debug, info};
use std::path::Path;

/// Image input normalizer
///
/// Turns a DICOM file, a raster image or (with no input) a synthetic
/// volume into an [`ImageTensor`]:
///
/// - raster: `[1, target_size, target_size, 3]`
/// - DICOM: `[1, rows, columns, 3]` (or `target_size` square when resampling)
/// - synthetic: `[1, height, width]`, a middle cross-section with a channel axis
///
/// # Example
///
/// ```
/// use medimage_core::{ImageNormalizer, NormalizerConfig, SyntheticConfig};
///
/// let config = NormalizerConfig::default().with_synthetic(SyntheticConfig {
///     dims: (32, 48, 48),
///     rad_max: 8,
///     seed: Some(1),
///     ..SyntheticConfig::default()
/// });
/// let normalizer = ImageNormalizer::new(config);
///
/// let tensor = normalizer.normalize(None).unwrap();
/// assert_eq!(tensor.shape(), &[1, 48, 48]);
/// assert!(tensor.is_normalized());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    config: NormalizerConfig,
}

impl ImageNormalizer {
    /// Creates a normalizer with the given configuration
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Decoder that `normalize` would use for `path`
    pub fn input_kind(&self, path: Option<&Path>) -> InputKind {
        InputKind::from_path(path, self.config.dicom_enabled)
    }

    /// Normalizes the image at `path`, or a synthetic volume when `path` is `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded or resized.
    pub fn normalize(&self, path: Option<&Path>) -> Result<ImageTensor> {
        let kind = self.input_kind(path);
        match path {
            None => self.normalize_synthetic(),
            Some(p) => {
                info!("Normalizing {} as {}", p.display(), kind);
                match kind {
                    InputKind::Dicom => self.dicom_tensor(dicom::decode_file(p)?),
                    _ => self.raster_tensor(&raster::open(p)?),
                }
            }
        }
    }

    /// Normalizes uploaded bytes
    ///
    /// The content is treated as DICOM when DICOM support is enabled and
    /// either `name_hint` has a DICOM extension or the bytes carry the
    /// "DICM" magic.
    pub fn normalize_bytes(&self, bytes: &[u8], name_hint: Option<&str>) -> Result<ImageTensor> {
        if bytes.is_empty() {
            return Err(MedImageError::ImageDecode("empty upload".to_string()));
        }
        let by_name = name_hint
            .map(|name| self.input_kind(Some(Path::new(name))) == InputKind::Dicom)
            .unwrap_or(false);
        let is_dicom = self.config.dicom_enabled && (by_name || dicom::has_dicom_magic(bytes));

        debug!(
            "Normalizing {} uploaded bytes as {}",
            bytes.len(),
            if is_dicom { "dicom" } else { "raster" }
        );
        if is_dicom {
            self.dicom_tensor(dicom::decode_bytes(bytes)?)
        } else {
            self.raster_tensor(&raster::load_bytes(bytes)?)
        }
    }

    /// Middle slice of a fresh synthetic volume, shaped `[1, H, W]`
    pub fn normalize_synthetic(&self) -> Result<ImageTensor> {
        let volume = synthetic::generate_volume(&self.config.synthetic)?;
        let slice = synthetic::middle_slice(&volume);
        let slice = slice.insert_axis(ndarray::Axis(0));
        Ok(ImageTensor::new(slice.into_dyn()))
    }

    fn raster_tensor(&self, image: &image::DynamicImage) -> Result<ImageTensor> {
        let pixels = raster::to_square_rgb(image, self.config.target_size);
        batch_tensor(pixels.height, pixels.width, pixels.values)
    }

    fn dicom_tensor(&self, pixels: dicom::DicomPixels) -> Result<ImageTensor> {
        let (rows, columns) = (pixels.rows, pixels.columns);
        let rgb = pixels.to_rgb();

        match self.config.dicom_resize {
            DicomResize::Native => batch_tensor(rows, columns, rgb),
            DicomResize::Resample => {
                let resampled =
                    raster::resample_rgb_f32(rgb, rows, columns, self.config.target_size)
                        .ok_or_else(|| {
                            MedImageError::Shape(format!(
                                "cannot resample {}x{} DICOM frame",
                                rows, columns
                            ))
                        })?;
                batch_tensor(resampled.height, resampled.width, resampled.values)
            }
        }
    }
}

/// `[1, height, width, 3]` tensor from interleaved RGB samples
fn batch_tensor(height: usize, width: usize, values: Vec<f32>) -> Result<ImageTensor> {
    let array = ndarray::Array4::from_shape_vec((1, height, width, 3), values)?;
    Ok(ImageTensor::new(array.into_dyn()))
}
