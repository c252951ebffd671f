use crate::error::{CxrError, Result};
use crate::types::ImageCodec;

/// Row-major 2-D array of raw pixel samples
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray<T> {
    pub rows: u32,
    pub columns: u32,
    samples: Vec<T>,
}

impl<T: Copy> PixelArray<T> {
    /// Wraps `samples` as a `rows` x `columns` array
    ///
    /// # Errors
    ///
    /// Returns an error if the sample count does not match the shape
    pub fn new(rows: u32, columns: u32, samples: Vec<T>) -> Result<Self> {
        let expected = rows as usize * columns as usize;
        if samples.len() != expected {
            return Err(CxrError::PixelDataError(format!(
                "expected {} samples for {}x{}, got {}",
                expected,
                rows,
                columns,
                samples.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            samples,
        })
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn get(&self, row: u32, column: u32) -> Option<T> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.samples
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
    }
}

/// Intensities in [0, 1], same shape as the source pixel array
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub rows: u32,
    pub columns: u32,
    pub(crate) data: Vec<f32>,
}

impl NormalizedImage {
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, row: u32, column: u32) -> Option<f32> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.data
            .get(row as usize * self.columns as usize + column as usize)
            .copied()
    }
}

/// Serialized raster ready to be written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub codec: ImageCodec,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}
