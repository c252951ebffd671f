use crate::error::{CxrError, Result};
use crate::types::{EncodedImage, ImageCodec, NormalizedImage};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Luma};
use std::io::Cursor;

/// JPEG quality used for the 8-bit codec
pub const JPEG_QUALITY: u8 = 100;

/// Nominal 16-bit scale; one above `u16::MAX`, so results are clamped
const SCALE_16: f32 = 65536.0;
const SCALE_8: f32 = 255.0;

type IntensityBuffer = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Resizes and serializes a normalized image
///
/// The image is resized with a bilinear (triangle) filter to exactly
/// `width` x `height`, then quantized to the codec's bit depth and encoded.
///
/// # Errors
///
/// Returns `InvalidDimensions` if either target side is zero.
pub fn encode(
    image: &NormalizedImage,
    width: u32,
    height: u32,
    codec: ImageCodec,
) -> Result<EncodedImage> {
    let resized = resize(image, width, height)?;
    let raster = quantize(&resized, codec);

    let format = match codec {
        ImageCodec::Jpeg => ImageOutputFormat::Jpeg(JPEG_QUALITY),
        ImageCodec::Png => ImageOutputFormat::Png,
    };

    let mut bytes = Vec::new();
    raster.write_to(&mut Cursor::new(&mut bytes), format)?;

    Ok(EncodedImage {
        codec,
        width,
        height,
        bytes,
    })
}

fn resize(image: &NormalizedImage, width: u32, height: u32) -> Result<IntensityBuffer> {
    if width == 0 || height == 0 {
        return Err(CxrError::InvalidDimensions { width, height });
    }

    let source: IntensityBuffer =
        ImageBuffer::from_raw(image.columns, image.rows, image.data.clone()).ok_or_else(|| {
            CxrError::ImageError(format!(
                "buffer does not match {}x{} image",
                image.columns, image.rows
            ))
        })?;

    Ok(imageops::resize(&source, width, height, FilterType::Triangle))
}

fn quantize(resized: &IntensityBuffer, codec: ImageCodec) -> DynamicImage {
    let (width, height) = resized.dimensions();
    match codec {
        ImageCodec::Jpeg => DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |x, y| {
            Luma([to_u8(resized.get_pixel(x, y)[0])])
        })),
        ImageCodec::Png => DynamicImage::ImageLuma16(ImageBuffer::from_fn(width, height, |x, y| {
            Luma([to_u16(resized.get_pixel(x, y)[0])])
        })),
    }
}

/// Scales an intensity in [0, 1] to 8 bits, truncating
pub fn to_u8(value: f32) -> u8 {
    (value * SCALE_8).clamp(0.0, SCALE_8) as u8
}

/// Scales an intensity in [0, 1] to 16 bits, truncating and clamping at 65535
pub fn to_u16(value: f32) -> u16 {
    (value * SCALE_16).clamp(0.0, u16::MAX as f32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::normalize;
    use crate::types::{PhotometricInterpretation, PixelArray};
    use rstest::rstest;

    fn gradient(rows: u32, columns: u32) -> NormalizedImage {
        let samples = (0..rows * columns).map(|i| i as i32).collect();
        let pixels = PixelArray::new(rows, columns, samples).unwrap();
        normalize(&pixels, PhotometricInterpretation::Monochrome2).unwrap()
    }

    #[rstest]
    #[case(ImageCodec::Jpeg, 64, 48)]
    #[case(ImageCodec::Png, 64, 48)]
    #[case(ImageCodec::Png, 7, 300)]
    #[case(ImageCodec::Jpeg, 1, 1)]
    fn test_output_dimensions(#[case] codec: ImageCodec, #[case] width: u32, #[case] height: u32) {
        let encoded = encode(&gradient(20, 30), width, height, codec).unwrap();
        assert_eq!((encoded.width, encoded.height), (width, height));

        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (width, height));
    }

    #[test]
    fn test_png_is_16_bit_and_reaches_max() {
        // All-white input: 1.0 * 65536 must clamp to 65535, not wrap to 0
        let pixels = PixelArray::new(4, 4, vec![900u16; 16]).unwrap();
        let image = normalize(&pixels, PhotometricInterpretation::Monochrome2).unwrap();
        let encoded = encode(&image, 8, 8, ImageCodec::Png).unwrap();

        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageLuma16(_)));
        let luma = decoded.into_luma16();
        assert!(luma.pixels().all(|p| p[0] == u16::MAX));
    }

    #[test]
    fn test_jpeg_is_8_bit() {
        let encoded = encode(&gradient(10, 10), 10, 10, ImageCodec::Jpeg).unwrap();
        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_png_is_lossless_for_black_and_white() {
        let pixels = PixelArray::new(2, 2, vec![0u16, 10, 10, 0]).unwrap();
        let image = normalize(&pixels, PhotometricInterpretation::Monochrome2).unwrap();
        let encoded = encode(&image, 2, 2, ImageCodec::Png).unwrap();

        let luma = image::load_from_memory(&encoded.bytes)
            .unwrap()
            .into_luma16();
        assert_eq!(luma.get_pixel(0, 0)[0], 0);
        assert_eq!(luma.get_pixel(1, 0)[0], u16::MAX);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = encode(&gradient(4, 4), 0, 10, ImageCodec::Png).unwrap_err();
        assert!(matches!(
            err,
            CxrError::InvalidDimensions {
                width: 0,
                height: 10
            }
        ));
    }

    #[rstest]
    #[case(0.0, 0, 0)]
    #[case(0.5, 127, 32768)]
    #[case(1.0, 255, 65535)]
    #[case(1.5, 255, 65535)]
    #[case(-0.2, 0, 0)]
    fn test_quantize(#[case] value: f32, #[case] expected_8: u8, #[case] expected_16: u16) {
        assert_eq!(to_u8(value), expected_8);
        assert_eq!(to_u16(value), expected_16);
    }
}
