use crate::error::{CxrError, Result};
use crate::extraction::tags::get_string_value;
use crate::types::{PhotometricInterpretation, PixelArray};
use dicom_dictionary_std::tags;
use dicom_object::{open_file, DefaultDicomObject, InMemDicomObject};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use std::path::Path;

/// Raw pixels of the first frame of a DICOM image, plus their polarity
#[derive(Debug, Clone, PartialEq)]
pub struct DicomImage {
    pub pixels: PixelArray<i32>,
    pub interpretation: PhotometricInterpretation,
}

impl DicomImage {
    /// Opens a DICOM file and decodes its pixel data
    pub fn from_file(path: &Path) -> Result<Self> {
        let dcm = open_file(path)?;
        Self::from_dicom(&dcm)
    }

    /// Decodes the first frame of an opened DICOM object
    ///
    /// Samples are the stored values: no rescale slope/intercept and no
    /// windowing is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel data cannot be decoded or holds more
    /// than one sample per pixel.
    pub fn from_dicom(dcm: &DefaultDicomObject) -> Result<Self> {
        let decoded = dcm.decode_pixel_data()?;

        let samples_per_pixel = decoded.samples_per_pixel();
        if samples_per_pixel != 1 {
            return Err(CxrError::PixelDataError(format!(
                "expected single-sample grayscale data, got {} samples per pixel",
                samples_per_pixel
            )));
        }

        let rows = decoded.rows();
        let columns = decoded.columns();
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let mut samples: Vec<i32> = decoded.to_vec_with_options(&options)?;

        let frame_len = rows as usize * columns as usize;
        if samples.len() < frame_len {
            return Err(CxrError::PixelDataError(format!(
                "pixel data holds {} samples, {}x{} needs {}",
                samples.len(),
                rows,
                columns,
                frame_len
            )));
        }
        samples.truncate(frame_len);

        Ok(Self {
            pixels: PixelArray::new(rows, columns, samples)?,
            interpretation: photometric_interpretation(dcm),
        })
    }
}

/// Reads the PhotometricInterpretation attribute
pub fn photometric_interpretation(dcm: &InMemDicomObject) -> PhotometricInterpretation {
    get_string_value(dcm, tags::PHOTOMETRIC_INTERPRETATION)
        .map(|s| PhotometricInterpretation::from_str(&s))
        .unwrap_or_default()
}
