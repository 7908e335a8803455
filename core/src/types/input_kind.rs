use std::fmt;
use std::path::Path;

/// File extensions routed to the DICOM decoder (compared case-insensitively)
pub const DICOM_EXTENSIONS: [&str; 2] = ["dcm", "dicom"];

/// Which decoder an input goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum InputKind {
    /// No input: a generated placeholder volume
    Synthetic,
    /// DICOM file
    Dicom,
    /// JPEG, PNG or any other format the raster decoder understands
    Raster,
}

impl InputKind {
    /// Chooses the decoder for an optional path
    ///
    /// With DICOM support disabled every path is treated as raster.
    pub fn from_path(path: Option<&Path>, dicom_enabled: bool) -> Self {
        match path {
            None => InputKind::Synthetic,
            Some(p) if dicom_enabled && has_dicom_extension(p) => InputKind::Dicom,
            Some(_) => InputKind::Raster,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            InputKind::Synthetic => "synthetic",
            InputKind::Dicom => "dicom",
            InputKind::Raster => "raster",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Checks for a `.dcm` or `.dicom` extension
pub fn has_dicom_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            DICOM_EXTENSIONS
                .iter()
                .any(|dicom_ext| ext.eq_ignore_ascii_case(dicom_ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("scan.dcm", true, InputKind::Dicom)]
    #[case("SCAN.DCM", true, InputKind::Dicom)]
    #[case("study/scan.dicom", true, InputKind::Dicom)]
    #[case("scan.dcm", false, InputKind::Raster)]
    #[case("scan.png", true, InputKind::Raster)]
    #[case("scan.jpeg", true, InputKind::Raster)]
    #[case("scan", true, InputKind::Raster)]
    fn test_from_path(#[case] path: &str, #[case] dicom: bool, #[case] expected: InputKind) {
        assert_eq!(InputKind::from_path(Some(Path::new(path)), dicom), expected);
    }

    #[test]
    fn test_no_path_is_synthetic() {
        assert_eq!(InputKind::from_path(None, true), InputKind::Synthetic);
        assert_eq!(InputKind::from_path(None, false), InputKind::Synthetic);
    }
}
