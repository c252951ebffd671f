//! Diagnosis labels derived from entity detection
//!
//! [`reduce_entities`] turns one case's entities into a label map;
//! [`LabelTable`] unifies label maps of many cases into one wide schema.

mod reducer;
mod schema;

pub use reducer::{is_positive_diagnosis, reduce_entities};
pub use schema::{LabelRow, LabelTable};
