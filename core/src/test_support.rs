//! Synthetic DICOM fixtures for tests

use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject};
use std::path::Path;

const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const DIGITAL_XRAY_FOR_PRESENTATION: &str = "1.2.840.10008.5.1.4.1.1.1.1";
const SOP_INSTANCE_UID: &str = "1.2.826.0.1.3680043.2.1125.1";

/// Builds a 16-bit unsigned grayscale dataset
pub fn dicom_dataset(rows: u16, columns: u16, samples: &[u16], photometric: &str) -> InMemDicomObject {
    let mut dcm = InMemDicomObject::new_empty();
    dcm.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(DIGITAL_XRAY_FOR_PRESENTATION),
    ));
    dcm.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(SOP_INSTANCE_UID),
    ));
    dcm.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(1_u16),
    ));
    dcm.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from(photometric),
    ));
    dcm.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)));
    dcm.put(DataElement::new(
        tags::COLUMNS,
        VR::US,
        PrimitiveValue::from(columns),
    ));
    dcm.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    dcm.put(DataElement::new(
        tags::BITS_STORED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    dcm.put(DataElement::new(
        tags::HIGH_BIT,
        VR::US,
        PrimitiveValue::from(15_u16),
    ));
    dcm.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    dcm.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(samples.iter().copied().collect()),
    ));
    dcm
}

/// Wraps a dataset with a file meta group
pub fn with_meta(dcm: InMemDicomObject) -> DefaultDicomObject {
    dcm.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(DIGITAL_XRAY_FOR_PRESENTATION)
            .media_storage_sop_instance_uid(SOP_INSTANCE_UID),
    )
    .unwrap()
}

/// Builds a file-backed style object ready for pixel decoding
pub fn dicom_image(rows: u16, columns: u16, samples: &[u16], photometric: &str) -> DefaultDicomObject {
    with_meta(dicom_dataset(rows, columns, samples, photometric))
}

/// Writes a grayscale DICOM file to `path`
pub fn write_dicom(path: &Path, rows: u16, columns: u16, samples: &[u16], photometric: &str) {
    dicom_image(rows, columns, samples, photometric)
        .write_to_file(path)
        .unwrap();
}
