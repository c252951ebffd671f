use std::fmt;
use thiserror::Error;

/// Result type for cxrprep operations
pub type Result<T> = std::result::Result<T, CxrError>;

/// Error types for cxrprep operations
#[derive(Error, Debug)]
pub enum CxrError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Pixel data could not be decoded
    #[error("Pixel data error: {0}")]
    PixelDataError(String),

    /// Every pixel sample is zero (or below), so there is nothing to scale against
    #[error("Image has no positive samples; cannot normalize")]
    EmptyImage,

    /// Requested raster target is not one of the supported codecs
    #[error("Unsupported image codec: {0}")]
    UnsupportedCodec(String),

    /// Requested output size has a zero side
    #[error("Invalid output dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Entity detection call failed (network, auth, quota, bad status)
    #[error("Entity detection failed: {0}")]
    RemoteService(String),

    /// Case has no report text, so nothing was sent for entity detection
    #[error("Case {0} has an empty report; not sent for entity detection")]
    EmptyReport(String),

    /// Entity detection result does not have the expected shape
    #[error("Malformed entity detection result: {0}")]
    MalformedEntities(String),

    /// Column not present in a table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Raster encoding error
    #[error("Image error: {0}")]
    ImageError(String),

    /// CSV error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CxrError {
    /// Whether this error invalidates the whole run rather than a single case
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CxrError::UnsupportedCodec(_)
                | CxrError::InvalidDimensions { .. }
                | CxrError::ConfigError(_)
        )
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for CxrError {
    fn from(e: dicom_object::ReadError) -> Self {
        CxrError::DicomError(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for CxrError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        CxrError::PixelDataError(format!("{}", e))
    }
}

impl From<image::ImageError> for CxrError {
    fn from(e: image::ImageError) -> Self {
        CxrError::ImageError(format!("{}", e))
    }
}

impl From<reqwest::Error> for CxrError {
    fn from(e: reqwest::Error) -> Self {
        CxrError::RemoteService(format!("{}", e))
    }
}

/// Data-quality conditions that are reported but never stop a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseWarning {
    /// A requested DICOM attribute is absent from an image
    MissingField { image: String, field: &'static str },

    /// A case directory lacks a report and/or images
    MalformedCase { case_id: String, reason: String },
}

impl fmt::Display for CaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseWarning::MissingField { image, field } => {
                write!(f, "{} has no {} attribute", image, field)
            }
            CaseWarning::MalformedCase { case_id, reason } => {
                write!(f, "case {}: {}", case_id, reason)
            }
        }
    }
}
