use crate::error::{CxrError, Result};
use std::fmt;

/// DICOM photometric interpretation
///
/// Only the polarity matters for normalization: `MONOCHROME1` stores
/// bright-as-low values and must be inverted, everything else passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhotometricInterpretation {
    #[default]
    Unknown,
    Monochrome1,
    Monochrome2,
    PaletteColor,
    Rgb,
    YbrFull,
    YbrFull422,
}

impl PhotometricInterpretation {
    /// Returns whether this is inverted (MONOCHROME1)
    pub fn is_inverted(&self) -> bool {
        matches!(self, PhotometricInterpretation::Monochrome1)
    }

    /// Parses photometric interpretation from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            _ => PhotometricInterpretation::Unknown,
        }
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhotometricInterpretation::Unknown => "UNKNOWN",
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
        };
        write!(f, "{}", name)
    }
}

/// Raster codec an image is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCodec {
    /// 8-bit lossy JPEG
    Jpeg,
    /// 16-bit lossless PNG
    Png,
}

impl ImageCodec {
    /// Resolves a codec from a file extension (case-insensitive, leading dot allowed)
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCodec` for anything other than jpg/jpeg/png
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageCodec::Jpeg),
            "png" => Ok(ImageCodec::Png),
            _ => Err(CxrError::UnsupportedCodec(ext.to_string())),
        }
    }

    /// Default file extension for this codec
    pub fn extension(&self) -> &'static str {
        match self {
            ImageCodec::Jpeg => "jpg",
            ImageCodec::Png => "png",
        }
    }
}

impl fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageCodec::Jpeg => write!(f, "jpeg"),
            ImageCodec::Png => write!(f, "png"),
        }
    }
}
