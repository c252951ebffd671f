//! Core type definitions for case processing
//!
//! This module provides the fundamental types used throughout the cxrprep library:
//! - [`Case`]: One case folder (report, images, derived labels)
//! - [`PixelArray`] / [`NormalizedImage`] / [`EncodedImage`]: Pixel data at each conversion step
//! - [`PhotometricInterpretation`]: Pixel polarity of a DICOM image
//! - [`ImageCodec`]: Supported raster targets
//! - [`Entity`] / [`Trait`]: Entity detection results

mod case;
mod entity;
mod enums;
mod pixels;

pub use case::{image_id, Case, LabelMap, ENTITY_DETECTION_FILENAME, LABELS_FILENAME};
pub use entity::{DetectEntitiesResponse, Entity, EntityCategory, Trait, TraitName};
pub use enums::{ImageCodec, PhotometricInterpretation};
pub use pixels::{EncodedImage, NormalizedImage, PixelArray};
