use thiserror::Error;

/// Result type for medimage operations
pub type Result<T> = std::result::Result<T, MedImageError>;

/// Error types for medimage operations
#[derive(Error, Debug)]
pub enum MedImageError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// Tag not found in DICOM file
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// Pixel data present but in an encoding we cannot decode
    #[error("Unsupported pixel data: {0}")]
    UnsupportedPixelData(String),

    /// Raster image decoding or resizing error
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Tensor shape mismatch
    #[error("Shape error: {0}")]
    Shape(String),

    /// Classifier failure
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Collaborator service failure
    #[error("Service error: {0}")]
    Service(String),

    /// Results store failure
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for MedImageError {
    fn from(s: String) -> Self {
        MedImageError::Service(s)
    }
}

impl From<&str> for MedImageError {
    fn from(s: &str) -> Self {
        MedImageError::Service(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for MedImageError {
    fn from(e: dicom_object::ReadError) -> Self {
        MedImageError::Dicom(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for MedImageError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        MedImageError::InvalidValue(format!("{}", e))
    }
}

impl From<image::ImageError> for MedImageError {
    fn from(e: image::ImageError) -> Self {
        MedImageError::ImageDecode(format!("{}", e))
    }
}

impl From<ndarray::ShapeError> for MedImageError {
    fn from(e: ndarray::ShapeError) -> Self {
        MedImageError::Shape(format!("{}", e))
    }
}

#[cfg(feature = "store")]
impl From<rusqlite::Error> for MedImageError {
    fn from(e: rusqlite::Error) -> Self {
        MedImageError::Store(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: MedImageError = io.into();
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_str_conversion_is_service_error() {
        let err: MedImageError = "backend offline".into();
        assert!(matches!(err, MedImageError::Service(_)));
        assert_eq!(err.to_string(), "Service error: backend offline");
    }
}
