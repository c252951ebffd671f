use crate::error::{CxrError, Result};
use crate::types::{NormalizedImage, PhotometricInterpretation, PixelArray};

/// Rescales raw samples into [0, 1]
///
/// Negative samples are floored at zero and every sample is divided by the
/// largest sample in the array. For `MONOCHROME1` each value `v` becomes
/// `1 - v`; every other interpretation passes through unchanged.
///
/// # Errors
///
/// Returns `EmptyImage` if the array has no positive sample (all black,
/// all negative, or no samples at all), since there is nothing to divide by.
///
/// # Example
///
/// ```
/// use cxrprep_core::imaging::normalize;
/// use cxrprep_core::{PhotometricInterpretation, PixelArray};
///
/// let pixels = PixelArray::new(1, 4, vec![-10i32, 0, 50, 100]).unwrap();
///
/// let image = normalize(&pixels, PhotometricInterpretation::Monochrome2).unwrap();
/// assert_eq!(image.data(), &[0.0, 0.0, 0.5, 1.0]);
///
/// let image = normalize(&pixels, PhotometricInterpretation::Monochrome1).unwrap();
/// assert_eq!(image.data(), &[1.0, 1.0, 0.5, 0.0]);
/// ```
pub fn normalize<T>(
    pixels: &PixelArray<T>,
    interpretation: PhotometricInterpretation,
) -> Result<NormalizedImage>
where
    T: Copy + Into<f64>,
{
    let max = pixels
        .samples()
        .iter()
        .map(|&s| s.into())
        .fold(f64::NEG_INFINITY, f64::max);

    // Also rejects an empty array, where max stays at -inf
    if max <= 0.0 || !max.is_finite() {
        return Err(CxrError::EmptyImage);
    }

    let invert = interpretation.is_inverted();
    let data = pixels
        .samples()
        .iter()
        .map(|&s| {
            let scaled = (s.into().max(0.0) / max).clamp(0.0, 1.0);
            let value = if invert { 1.0 - scaled } else { scaled };
            value as f32
        })
        .collect();

    Ok(NormalizedImage {
        rows: pixels.rows,
        columns: pixels.columns,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ramp() -> PixelArray<i32> {
        PixelArray::new(2, 3, vec![-5, 0, 10, 20, 30, 40]).unwrap()
    }

    #[rstest]
    #[case(PhotometricInterpretation::Monochrome2)]
    #[case(PhotometricInterpretation::Rgb)]
    #[case(PhotometricInterpretation::Unknown)]
    fn test_non_inverted_passthrough(#[case] interpretation: PhotometricInterpretation) {
        let pixels = ramp();
        let image = normalize(&pixels, interpretation).unwrap();

        for (raw, value) in pixels.samples().iter().zip(image.data()) {
            let expected = (*raw).max(0) as f32 / 40.0;
            assert!((value - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_monochrome1_inverts() {
        let pixels = ramp();
        let image = normalize(&pixels, PhotometricInterpretation::Monochrome1).unwrap();

        for (raw, value) in pixels.samples().iter().zip(image.data()) {
            let expected = 1.0 - (*raw).max(0) as f32 / 40.0;
            assert!((value - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_output_in_unit_range() {
        let pixels = PixelArray::new(1, 5, vec![0u16, 1, 4095, 65535, 12]).unwrap();
        for interpretation in [
            PhotometricInterpretation::Monochrome1,
            PhotometricInterpretation::Monochrome2,
        ] {
            let image = normalize(&pixels, interpretation).unwrap();
            assert!(image.data().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_shape_preserved() {
        let image = normalize(&ramp(), PhotometricInterpretation::Monochrome2).unwrap();
        assert_eq!(image.rows, 2);
        assert_eq!(image.columns, 3);
        assert_eq!(image.get(1, 2), Some(1.0));
    }

    #[rstest]
    #[case(vec![0i32; 6])]
    #[case(vec![-3i32, -1, -7, -2, -9, -4])]
    fn test_no_positive_samples_is_empty_image(#[case] samples: Vec<i32>) {
        let pixels = PixelArray::new(2, 3, samples).unwrap();
        let err = normalize(&pixels, PhotometricInterpretation::Monochrome2).unwrap_err();
        assert!(matches!(err, CxrError::EmptyImage));
    }

    #[test]
    fn test_zero_sized_is_empty_image() {
        let pixels = PixelArray::new(0, 0, Vec::<u8>::new()).unwrap();
        assert!(matches!(
            normalize(&pixels, PhotometricInterpretation::Monochrome1),
            Err(CxrError::EmptyImage)
        ));
    }

    #[test]
    fn test_saturated_monochrome1_is_black() {
        let pixels = PixelArray::new(3, 3, vec![812u16; 9]).unwrap();
        let image = normalize(&pixels, PhotometricInterpretation::Monochrome1).unwrap();
        assert!(image.data().iter().all(|&v| v == 0.0));
    }
}
