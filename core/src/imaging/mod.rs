//! DICOM pixel data to raster image conversion
//!
//! Conversion runs in three steps:
//! 1. [`DicomImage`]: decode the stored samples and photometric interpretation
//! 2. [`normalize`]: rescale into [0, 1], inverting `MONOCHROME1`
//! 3. [`encode`]: resize and serialize as 8-bit JPEG or 16-bit PNG

mod decode;
mod encode;
mod normalize;

pub use decode::{photometric_interpretation, DicomImage};
pub use encode::{encode, to_u16, to_u8, JPEG_QUALITY};
pub use normalize::normalize;

use crate::error::{CxrError, Result};
use crate::types::{EncodedImage, ImageCodec};
use std::path::Path;

/// Output raster settings shared by every image in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub codec: ImageCodec,
    /// Extension written to disk (keeps the operator's spelling, e.g. "jpeg")
    pub extension: String,
    pub width: u32,
    pub height: u32,
}

impl ImageTarget {
    /// Validates an extension and size
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCodec` for an unknown extension and
    /// `InvalidDimensions` if either side is zero.
    pub fn new(extension: &str, width: u32, height: u32) -> Result<Self> {
        let codec = ImageCodec::from_extension(extension)?;
        if width == 0 || height == 0 {
            return Err(CxrError::InvalidDimensions { width, height });
        }
        Ok(Self {
            codec,
            extension: extension.trim_start_matches('.').to_string(),
            width,
            height,
        })
    }
}

impl Default for ImageTarget {
    fn default() -> Self {
        Self {
            codec: ImageCodec::Jpeg,
            extension: ImageCodec::Jpeg.extension().to_string(),
            width: 500,
            height: 500,
        }
    }
}

/// Converts a decoded DICOM image to an encoded raster
pub fn convert(image: &DicomImage, target: &ImageTarget) -> Result<EncodedImage> {
    let normalized = normalize(&image.pixels, image.interpretation)?;
    encode(&normalized, target.width, target.height, target.codec)
}

/// Converts one DICOM file and writes the raster to `output`
pub fn convert_file(dicom_file: &Path, output: &Path, target: &ImageTarget) -> Result<()> {
    let image = DicomImage::from_file(dicom_file)?;
    let encoded = convert(&image, target)?;
    std::fs::write(output, &encoded.bytes)?;
    Ok(())
}
