//! Raster image decoding (JPEG, PNG and the other formats `image` reads)

use crate::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use log::debug;
use std::path::Path;

/// Interpolation used when resizing raster inputs
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Interleaved RGB samples in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPixels {
    pub height: usize,
    pub width: usize,
    pub values: Vec<f32>,
}

/// Opens an image file, guessing the format from its content
pub fn open(path: &Path) -> Result<DynamicImage> {
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    debug!(
        "Decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Decodes an in-memory image
pub fn load_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Resizes to `size x size` (aspect ratio is not kept) and scales to `[0, 1]`
///
/// Grayscale and alpha images are converted to three-channel RGB.
pub fn to_square_rgb(image: &DynamicImage, size: u32) -> RasterPixels {
    let resized = if image.dimensions() == (size, size) {
        image.clone()
    } else {
        image.resize_exact(size, size, RESIZE_FILTER)
    };
    let rgb = resized.to_rgb8();

    RasterPixels {
        height: rgb.height() as usize,
        width: rgb.width() as usize,
        values: rgb.into_raw().iter().map(|&v| v as f32 / 255.0).collect(),
    }
}

/// Resamples interleaved RGB `f32` samples to `size x size`
///
/// Returns `None` if `values` does not match `height x width x 3`.
pub fn resample_rgb_f32(
    values: Vec<f32>,
    height: usize,
    width: usize,
    size: u32,
) -> Option<RasterPixels> {
    let buffer: ImageBuffer<Rgb<f32>, Vec<f32>> =
        ImageBuffer::from_raw(width as u32, height as u32, values)?;
    let resized = image::imageops::resize(&buffer, size, size, FilterType::Triangle);

    Some(RasterPixels {
        height: size as usize,
        width: size as usize,
        values: resized
            .into_raw()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_open_png_and_resize() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        RgbImage::from_pixel(300, 300, Rgb([255, 128, 0]))
            .save(&path)
            .unwrap();

        let image = open(&path).unwrap();
        let pixels = to_square_rgb(&image, 224);
        assert_eq!((pixels.height, pixels.width), (224, 224));
        assert_eq!(pixels.values.len(), 224 * 224 * 3);
        assert!(pixels.values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(pixels.values[0], 1.0);
        assert_eq!(pixels.values[2], 0.0);
    }

    #[test]
    fn test_grayscale_becomes_rgb() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 20, Luma([51])));
        let pixels = to_square_rgb(&image, 8);
        assert_eq!(pixels.values.len(), 8 * 8 * 3);
        assert!(pixels.values.iter().all(|&v| (v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 7])));
        let pixels = to_square_rgb(&image, 4);
        assert_eq!(pixels.values.len(), 4 * 4 * 3);
        assert_eq!(&pixels.values[..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(open(&temp_dir.path().join("absent.png")).is_err());
    }

    #[test]
    fn test_open_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(open(&path).is_err());
    }

    #[test]
    fn test_load_bytes_roundtrip_dims() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        RgbImage::from_pixel(5, 7, Rgb([1, 2, 3]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let image = load_bytes(bytes.get_ref()).unwrap();
        assert_eq!(image.dimensions(), (5, 7));
    }

    #[test]
    fn test_resample_rgb_f32() {
        let values = vec![0.5; 4 * 6 * 3];
        let pixels = resample_rgb_f32(values, 4, 6, 10).unwrap();
        assert_eq!((pixels.height, pixels.width), (10, 10));
        assert!(pixels.values.iter().all(|&v| (v - 0.5).abs() < 1e-5));

        assert!(resample_rgb_f32(vec![0.0; 5], 4, 6, 10).is_none());
    }
}
