//! Decoders for the three input kinds
//!
//! - [`dicom`]: native DICOM pixel data
//! - [`raster`]: JPEG, PNG and other raster formats
//! - [`synthetic`]: generated placeholder volumes

pub mod dicom;
pub mod raster;
pub mod synthetic;
pub mod tags;

pub use self::dicom::{decode_bytes, decode_file, decode_pixels, has_dicom_magic, DicomPixels};
pub use raster::RasterPixels;
pub use synthetic::{generate_volume, middle_slice};
