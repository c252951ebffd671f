use crate::error::CaseWarning;
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use log::debug;
use std::fmt;

/// Descriptive attributes copied into the tags table, in column order
pub const TAG_FIELDS: [(&str, Tag); 5] = [
    ("ViewPosition", tags::VIEW_POSITION),
    ("PhotometricInterpretation", tags::PHOTOMETRIC_INTERPRETATION),
    ("SeriesDescription", tags::SERIES_DESCRIPTION),
    ("ImageComments", tags::IMAGE_COMMENTS),
    (
        "AcquisitionDeviceProcessingDescription",
        tags::ACQUISITION_DEVICE_PROCESSING_DESCRIPTION,
    ),
];

/// Value of one requested attribute
///
/// A missing attribute is an explicit `Absent` so every row keeps the same arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Present(String),
    Absent,
}

impl TagValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, TagValue::Absent)
    }
}

/// Absent values render as an empty cell
impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Present(s) => write!(f, "{}", s),
            TagValue::Absent => Ok(()),
        }
    }
}

/// Column names of the fixed attribute list
pub fn tag_field_names() -> impl Iterator<Item = &'static str> {
    TAG_FIELDS.iter().map(|(name, _)| *name)
}

/// Reads every attribute of [`TAG_FIELDS`], in order
///
/// `image` names the source in the debug log for missing attributes.
pub fn extract_tag_values(dcm: &InMemDicomObject, image: &str) -> Vec<TagValue> {
    TAG_FIELDS
        .iter()
        .map(|(name, tag)| match get_string_value(dcm, *tag) {
            Some(value) => TagValue::Present(value),
            None => {
                let warning = CaseWarning::MissingField {
                    image: image.to_string(),
                    field: *name,
                };
                debug!("{}", warning);
                TagValue::Absent
            }
        })
        .collect()
}

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}
