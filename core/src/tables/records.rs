//! Fixed row layouts of the tags, entities and cases tables

use crate::extraction::{tag_field_names, TagValue};
use crate::types::{Case, Entity};
use std::path::Path;

pub const TAGS_FILENAME: &str = "tags.csv";
pub const ENTITIES_FILENAME: &str = "entities.csv";
pub const CASES_FILENAME: &str = "cases.csv";
pub const MASTER_FILENAME: &str = "master.csv";

/// Traits flattened per entity row; extra traits are dropped
pub const NUM_TRAITS: usize = 3;

/// `Case ID, Image ID, <tag names>`
pub fn tags_header() -> Vec<String> {
    ["Case ID", "Image ID"]
        .into_iter()
        .chain(tag_field_names())
        .map(String::from)
        .collect()
}

pub fn tag_row(case_id: &str, image_id: &str, values: &[TagValue]) -> Vec<String> {
    [case_id.to_string(), image_id.to_string()]
        .into_iter()
        .chain(values.iter().map(|v| v.to_string()))
        .collect()
}

/// `Case ID, Text, Category, Type, Score, Trait 0 Name, Trait 0 Score, ...`
pub fn entities_header() -> Vec<String> {
    let mut header: Vec<String> = ["Case ID", "Text", "Category", "Type", "Score"]
        .into_iter()
        .map(String::from)
        .collect();
    for i in 0..NUM_TRAITS {
        header.push(format!("Trait {} Name", i));
        header.push(format!("Trait {} Score", i));
    }
    header
}

/// One row per entity, always `entities_header().len()` cells wide
pub fn entity_row(case_id: &str, entity: &Entity) -> Vec<String> {
    let mut row = vec![
        case_id.to_string(),
        entity.text.clone(),
        entity.category.to_string(),
        entity.entity_type.clone(),
        entity.score.to_string(),
    ];
    for i in 0..NUM_TRAITS {
        match entity.traits.get(i) {
            Some(t) => {
                row.push(t.name.to_string());
                row.push(t.score.to_string());
            }
            None => {
                row.push(String::new());
                row.push(String::new());
            }
        }
    }
    row
}

/// `ID, Report, Source Folder, Output Folder`
pub fn cases_header() -> Vec<String> {
    ["ID", "Report", "Source Folder", "Output Folder"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn case_row(case: &Case, source_folder: &Path) -> Vec<String> {
    vec![
        case.id.clone(),
        case.report_text.clone(),
        source_folder.display().to_string(),
        case.output_directory.display().to_string(),
    ]
}
