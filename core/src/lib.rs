pub mod cli;
pub mod discovery;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod labels;
pub mod nlp;
pub mod pipeline;
pub mod tables;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::report::TextReport;
pub use discovery::discover_cases;
pub use error::{CaseWarning, CxrError, Result};
pub use imaging::{DicomImage, ImageTarget};
pub use labels::{reduce_entities, LabelTable};
pub use nlp::{EntityDetector, HttpEntityDetector};
pub use pipeline::{BatchReport, Pipeline, PipelineConfig, Stages};
pub use tables::{outer_join, Table};
pub use types::*;
