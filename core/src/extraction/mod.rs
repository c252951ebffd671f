pub mod tags;

pub use tags::{extract_tag_values, get_string_value, tag_field_names, TagValue, TAG_FIELDS};
