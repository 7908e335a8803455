//! Native DICOM pixel payload decoding
//!
//! Reads the Image Pixel module of a DICOM object and turns the first
//! frame into normalized `f32` samples. Only native (uncompressed)
//! pixel data is handled; encapsulated transfer syntaxes are rejected.

use crate::decode::tags::{
    get_int_value, get_string_value, get_u16_value, BITS_ALLOCATED, BITS_STORED, COLUMNS,
    NUMBER_OF_FRAMES, PHOTOMETRIC_INTERPRETATION, PIXEL_DATA, PIXEL_REPRESENTATION,
    PLANAR_CONFIGURATION, ROWS, SAMPLES_PER_PIXEL,
};
use crate::error::{MedImageError, Result};
use crate::types::PhotometricInterpretation;
use dicom_core::value::{PrimitiveValue, Value};
use dicom_object::{from_reader, open_file, InMemDicomObject};
use log::{debug, warn};
use std::path::Path;

/// Offset of the "DICM" magic in a file with the standard preamble
const DICM_OFFSET: usize = 128;

/// First frame of a DICOM image, normalized to `[0, 1]`
///
/// Samples are interleaved row-major: `values[(row * columns + col) * samples + s]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomPixels {
    pub rows: usize,
    pub columns: usize,
    /// 1 for monochrome, 3 for color
    pub samples: usize,
    pub bits_stored: u16,
    pub photometric: PhotometricInterpretation,
    pub values: Vec<f32>,
}

impl DicomPixels {
    /// Expands to three interleaved channels
    ///
    /// Monochrome samples are copied into R, G and B; color data is returned as-is.
    pub fn to_rgb(&self) -> Vec<f32> {
        if self.samples == 3 {
            return self.values.clone();
        }
        self.values.iter().flat_map(|&v| [v, v, v]).collect()
    }
}

/// Checks for the "DICM" magic after the 128-byte preamble
pub fn has_dicom_magic(bytes: &[u8]) -> bool {
    bytes.len() >= DICM_OFFSET + 4 && &bytes[DICM_OFFSET..DICM_OFFSET + 4] == b"DICM"
}

/// Opens a DICOM file and decodes its first frame
pub fn decode_file(path: &Path) -> Result<DicomPixels> {
    let dcm = open_file(path)?;
    decode_pixels(&dcm)
}

/// Parses an in-memory DICOM file (with or without preamble) and decodes its first frame
pub fn decode_bytes(bytes: &[u8]) -> Result<DicomPixels> {
    let body = if has_dicom_magic(bytes) {
        &bytes[DICM_OFFSET..]
    } else {
        bytes
    };
    let dcm = from_reader(body)?;
    decode_pixels(&dcm)
}

/// Decodes the first frame of an already-opened DICOM object
///
/// # Errors
///
/// Returns an error if:
/// - Rows, Columns, BitsAllocated or PixelData are missing
/// - the pixel data is encapsulated or uses an unsupported layout
/// - the payload is shorter than one frame
pub fn decode_pixels(dcm: &InMemDicomObject) -> Result<DicomPixels> {
    let rows = get_u16_value(dcm, ROWS)
        .ok_or_else(|| MedImageError::TagNotFound("Rows".to_string()))? as usize;
    let columns = get_u16_value(dcm, COLUMNS)
        .ok_or_else(|| MedImageError::TagNotFound("Columns".to_string()))?
        as usize;
    let bits_allocated = get_u16_value(dcm, BITS_ALLOCATED)
        .ok_or_else(|| MedImageError::TagNotFound("BitsAllocated".to_string()))?;
    let bits_stored = get_u16_value(dcm, BITS_STORED)
        .unwrap_or(bits_allocated)
        .clamp(1, bits_allocated.max(1));
    let samples = get_u16_value(dcm, SAMPLES_PER_PIXEL).unwrap_or(1) as usize;
    let signed = get_u16_value(dcm, PIXEL_REPRESENTATION).unwrap_or(0) == 1;
    let planar = get_u16_value(dcm, PLANAR_CONFIGURATION).unwrap_or(0) == 1;
    let frames = get_int_value(dcm, NUMBER_OF_FRAMES).unwrap_or(1).max(1);
    let photometric = get_string_value(dcm, PHOTOMETRIC_INTERPRETATION)
        .map(|s| PhotometricInterpretation::from_str(&s))
        .unwrap_or(if samples == 3 {
            PhotometricInterpretation::Rgb
        } else {
            PhotometricInterpretation::Monochrome2
        });

    if rows == 0 || columns == 0 {
        return Err(MedImageError::InvalidValue(format!(
            "image has zero size ({}x{})",
            rows, columns
        )));
    }
    if samples != 1 && samples != 3 {
        return Err(MedImageError::UnsupportedPixelData(format!(
            "{} samples per pixel",
            samples
        )));
    }
    if bits_allocated != 8 && bits_allocated != 16 {
        return Err(MedImageError::UnsupportedPixelData(format!(
            "{} bits allocated",
            bits_allocated
        )));
    }
    if photometric == PhotometricInterpretation::PaletteColor {
        return Err(MedImageError::UnsupportedPixelData(
            "PALETTE COLOR photometric interpretation".to_string(),
        ));
    }

    debug!(
        "Decoding DICOM pixels: {}x{}, {} sample(s), {}/{} bits, {}, {} frame(s)",
        rows, columns, samples, bits_stored, bits_allocated, photometric, frames
    );

    let element = dcm
        .element(PIXEL_DATA)
        .map_err(|_| MedImageError::TagNotFound("PixelData".to_string()))?;
    let primitive = match element.value() {
        Value::Primitive(p) => p,
        Value::PixelSequence { .. } => {
            return Err(MedImageError::UnsupportedPixelData(
                "encapsulated (compressed) pixel data".to_string(),
            ))
        }
        _ => {
            return Err(MedImageError::InvalidValue(
                "PixelData is not a primitive value".to_string(),
            ))
        }
    };

    let raw = read_samples(primitive, bits_allocated, bits_stored, signed)?;

    let frame_len = rows * columns * samples;
    if raw.len() < frame_len {
        return Err(MedImageError::InvalidValue(format!(
            "pixel data holds {} samples, one frame needs {}",
            raw.len(),
            frame_len
        )));
    }
    if frames > 1 {
        warn!("Multi-frame DICOM ({} frames); using the first frame", frames);
    }

    let mut frame = raw[..frame_len].to_vec();
    if samples == 3 && planar {
        frame = interleave_planes(&frame, rows * columns);
    }

    let max = max_sample_value(bits_stored, signed);
    let mut values: Vec<f32> = frame
        .iter()
        .map(|&v| (v.max(0.0) / max).min(1.0))
        .collect();

    if photometric.is_inverted() {
        values.iter_mut().for_each(|v| *v = 1.0 - *v);
    }
    if samples == 3 && photometric.is_ybr() {
        ybr_to_rgb(&mut values);
    }

    Ok(DicomPixels {
        rows,
        columns,
        samples,
        bits_stored,
        photometric,
        values,
    })
}

/// Converts the stored payload to raw sample values
fn read_samples(
    primitive: &PrimitiveValue,
    bits_allocated: u16,
    bits_stored: u16,
    signed: bool,
) -> Result<Vec<f32>> {
    let samples = match (primitive, bits_allocated) {
        (PrimitiveValue::U8(bytes), 8) => bytes
            .iter()
            .map(|&b| stored_value(b as u16, bits_stored, signed))
            .collect(),
        (PrimitiveValue::U8(bytes), 16) => bytes
            .chunks_exact(2)
            .map(|c| stored_value(u16::from_le_bytes([c[0], c[1]]), bits_stored, signed))
            .collect(),
        (PrimitiveValue::U16(words), 16) => words
            .iter()
            .map(|&w| stored_value(w, bits_stored, signed))
            .collect(),
        (PrimitiveValue::I16(words), 16) => words
            .iter()
            .map(|&w| stored_value(w as u16, bits_stored, signed))
            .collect(),
        // OW payload carrying 8-bit samples
        (PrimitiveValue::U16(words), 8) => words
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .map(|b| stored_value(b as u16, bits_stored, signed))
            .collect(),
        (_, bits) => {
            return Err(MedImageError::UnsupportedPixelData(format!(
                "PixelData value type does not match {} bits allocated",
                bits
            )))
        }
    };
    Ok(samples)
}

/// Masks to BitsStored and sign-extends when PixelRepresentation is signed
fn stored_value(raw: u16, bits_stored: u16, signed: bool) -> f32 {
    let bits = bits_stored.min(16) as u32;
    let masked = if bits >= 16 {
        raw as u32
    } else {
        raw as u32 & ((1u32 << bits) - 1)
    };
    if signed && bits > 0 && masked & (1 << (bits - 1)) != 0 {
        masked as f32 - (1u32 << bits) as f32
    } else {
        masked as f32
    }
}

/// Largest positive stored value; 255 for 8-bit unsigned data
fn max_sample_value(bits_stored: u16, signed: bool) -> f32 {
    let bits = if signed {
        bits_stored.saturating_sub(1)
    } else {
        bits_stored
    };
    (((1u32 << bits.min(16)) - 1) as f32).max(1.0)
}

/// Planar configuration 1 (RRR..GGG..BBB) to interleaved (RGBRGB..)
fn interleave_planes(planar: &[f32], plane_len: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(planar.len());
    for i in 0..plane_len {
        for c in 0..3 {
            out.push(planar[c * plane_len + i]);
        }
    }
    out
}

/// Full-range YCbCr to RGB on normalized samples
fn ybr_to_rgb(values: &mut [f32]) {
    for px in values.chunks_exact_mut(3) {
        let (y, cb, cr) = (px[0], px[1] - 0.5, px[2] - 0.5);
        px[0] = (y + 1.402 * cr).clamp(0.0, 1.0);
        px[1] = (y - 0.344_136 * cb - 0.714_136 * cr).clamp(0.0, 1.0);
        px[2] = (y + 1.772 * cb).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tags::{SOP_CLASS_UID, SOP_INSTANCE_UID};
    use dicom_core::{DataElement, Tag, VR};
    use dicom_object::FileMetaTableBuilder;
    use rstest::rstest;
    use tempfile::TempDir;

    const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";
    const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

    fn put_u16(dcm: &mut InMemDicomObject, tag: Tag, value: u16) {
        dcm.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
    }

    fn mono8(rows: u16, columns: u16, pixels: Vec<u8>, photometric: &str) -> InMemDicomObject {
        let mut dcm = InMemDicomObject::new_empty();
        put_u16(&mut dcm, ROWS, rows);
        put_u16(&mut dcm, COLUMNS, columns);
        put_u16(&mut dcm, SAMPLES_PER_PIXEL, 1);
        put_u16(&mut dcm, BITS_ALLOCATED, 8);
        put_u16(&mut dcm, BITS_STORED, 8);
        put_u16(&mut dcm, PIXEL_REPRESENTATION, 0);
        dcm.put(DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from(photometric),
        ));
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OB,
            PrimitiveValue::U8(pixels.into()),
        ));
        dcm
    }

    #[test]
    fn test_decode_mono8() {
        let dcm = mono8(2, 2, vec![0, 51, 255, 102], "MONOCHROME2");
        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!((pixels.rows, pixels.columns, pixels.samples), (2, 2, 1));
        assert_eq!(pixels.values, vec![0.0, 0.2, 1.0, 0.4]);
    }

    #[test]
    fn test_to_rgb_replicates_channel() {
        let dcm = mono8(1, 2, vec![0, 255], "MONOCHROME2");
        let rgb = decode_pixels(&dcm).unwrap().to_rgb();
        assert_eq!(rgb, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_monochrome1_is_inverted() {
        let dcm = mono8(1, 2, vec![0, 255], "MONOCHROME1");
        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!(pixels.values, vec![1.0, 0.0]);
    }

    #[test]
    fn test_decode_mono16_stays_normalized() {
        let mut dcm = InMemDicomObject::new_empty();
        put_u16(&mut dcm, ROWS, 1);
        put_u16(&mut dcm, COLUMNS, 3);
        put_u16(&mut dcm, BITS_ALLOCATED, 16);
        put_u16(&mut dcm, BITS_STORED, 12);
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(vec![0, 4095, 0xF000 | 4095].into()),
        ));

        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!(pixels.bits_stored, 12);
        // high bits beyond BitsStored are masked off
        assert_eq!(pixels.values, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_signed_values_clamped_at_zero() {
        let mut dcm = InMemDicomObject::new_empty();
        put_u16(&mut dcm, ROWS, 1);
        put_u16(&mut dcm, COLUMNS, 2);
        put_u16(&mut dcm, BITS_ALLOCATED, 16);
        put_u16(&mut dcm, BITS_STORED, 16);
        put_u16(&mut dcm, PIXEL_REPRESENTATION, 1);
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::I16(vec![-1000, 32767].into()),
        ));

        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!(pixels.values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_planar_rgb_is_interleaved() {
        let mut dcm = InMemDicomObject::new_empty();
        put_u16(&mut dcm, ROWS, 1);
        put_u16(&mut dcm, COLUMNS, 2);
        put_u16(&mut dcm, SAMPLES_PER_PIXEL, 3);
        put_u16(&mut dcm, PLANAR_CONFIGURATION, 1);
        put_u16(&mut dcm, BITS_ALLOCATED, 8);
        dcm.put(DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("RGB"),
        ));
        // R plane, G plane, B plane
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OB,
            PrimitiveValue::U8(vec![255, 0, 0, 255, 0, 0].into()),
        ));

        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!(pixels.samples, 3);
        assert_eq!(pixels.values, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(pixels.to_rgb(), pixels.values);
    }

    #[test]
    fn test_ybr_full_is_converted_to_rgb() {
        let mut dcm = InMemDicomObject::new_empty();
        put_u16(&mut dcm, ROWS, 1);
        put_u16(&mut dcm, COLUMNS, 3);
        put_u16(&mut dcm, SAMPLES_PER_PIXEL, 3);
        put_u16(&mut dcm, BITS_ALLOCATED, 8);
        dcm.put(DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("YBR_FULL"),
        ));
        // red, black, white as interleaved Y Cb Cr
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OB,
            PrimitiveValue::U8(vec![76, 85, 255, 0, 128, 128, 255, 128, 128].into()),
        ));

        let pixels = decode_pixels(&dcm).unwrap();
        let expected = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert_eq!(pixels.values.len(), expected.len());
        for (got, want) in pixels.values.iter().zip(expected) {
            assert!((got - want).abs() < 0.02, "{} vs {}", got, want);
        }
        assert!(pixels.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_multi_frame_uses_first_frame() {
        let mut dcm = mono8(1, 2, vec![255, 255, 0, 0], "MONOCHROME2");
        dcm.put(DataElement::new(
            NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from("2"),
        ));
        let pixels = decode_pixels(&dcm).unwrap();
        assert_eq!(pixels.values, vec![1.0, 1.0]);
    }

    #[rstest]
    #[case(ROWS, "Rows")]
    #[case(COLUMNS, "Columns")]
    #[case(BITS_ALLOCATED, "BitsAllocated")]
    #[case(PIXEL_DATA, "PixelData")]
    fn test_missing_required_tag(#[case] tag: Tag, #[case] name: &str) {
        let mut dcm = mono8(2, 2, vec![0; 4], "MONOCHROME2");
        dcm.remove_element(tag);
        match decode_pixels(&dcm) {
            Err(MedImageError::TagNotFound(found)) => assert_eq!(found, name),
            other => panic!("expected TagNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_short_payload_is_error() {
        let dcm = mono8(4, 4, vec![0; 3], "MONOCHROME2");
        assert!(matches!(
            decode_pixels(&dcm),
            Err(MedImageError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_palette_color_unsupported() {
        let dcm = mono8(1, 1, vec![0], "PALETTE COLOR");
        assert!(matches!(
            decode_pixels(&dcm),
            Err(MedImageError::UnsupportedPixelData(_))
        ));
    }

    #[test]
    fn test_has_dicom_magic() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        assert!(has_dicom_magic(&bytes));
        assert!(!has_dicom_magic(b"DICM"));
        bytes[128] = b'X';
        assert!(!has_dicom_magic(&bytes));
    }

    #[test]
    fn test_decode_file_and_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.dcm");

        let mut dcm = mono8(2, 3, vec![0, 255, 0, 255, 0, 255], "MONOCHROME2");
        dcm.put(DataElement::new(
            SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(SECONDARY_CAPTURE),
        ));
        dcm.put(DataElement::new(
            SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3.4.5"),
        ));
        let file = dcm
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LE)
                    .media_storage_sop_class_uid(SECONDARY_CAPTURE)
                    .media_storage_sop_instance_uid("1.2.3.4.5"),
            )
            .unwrap();
        file.write_to_file(&path).unwrap();

        let from_file = decode_file(&path).unwrap();
        assert_eq!((from_file.rows, from_file.columns), (2, 3));
        assert_eq!(from_file.values, vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);

        let bytes = std::fs::read(&path).unwrap();
        assert!(has_dicom_magic(&bytes));
        assert_eq!(decode_bytes(&bytes).unwrap(), from_file);
    }

    #[test]
    fn test_decode_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = decode_file(&temp_dir.path().join("absent.dcm")).unwrap_err();
        assert!(matches!(err, MedImageError::Dicom(_)));
    }
}
