use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Diagnosis name mapped to asserted presence
pub type LabelMap = BTreeMap<String, bool>;

/// File name of the persisted entity detection result inside a case output directory
pub const ENTITY_DETECTION_FILENAME: &str = "entity_detection.json";

/// File name of label tables (per case and batch-wide)
pub const LABELS_FILENAME: &str = "labels.csv";

/// One patient encounter: a report plus zero or more images
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Folder name of the case, unique within a run
    pub id: String,

    /// Directory the case was discovered in
    pub source_directory: PathBuf,

    /// Directory all per-case artifacts are written to
    pub output_directory: PathBuf,

    /// DICOM images, sorted by file name
    pub dicom_files: Vec<PathBuf>,

    /// Report text (empty if the case has no report)
    pub report_text: String,

    /// Labels derived from entity detection
    pub labels: LabelMap,
}

impl Case {
    /// Creates a case with no labels yet
    pub fn new(
        id: impl Into<String>,
        source_directory: PathBuf,
        output_directory: PathBuf,
        dicom_files: Vec<PathBuf>,
        report_text: String,
    ) -> Self {
        Self {
            id: id.into(),
            source_directory,
            output_directory,
            dicom_files,
            report_text,
            labels: LabelMap::new(),
        }
    }

    /// Path of the persisted entity detection result
    pub fn entity_detection_path(&self) -> PathBuf {
        self.output_directory.join(ENTITY_DETECTION_FILENAME)
    }

    /// Path of this case's own label table
    pub fn labels_path(&self) -> PathBuf {
        self.output_directory.join(LABELS_FILENAME)
    }

    /// Output path for a converted image, replacing the source extension
    pub fn image_output_path(&self, dicom_file: &Path, extension: &str) -> PathBuf {
        let file_name = dicom_file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&self.id));
        self.output_directory
            .join(file_name)
            .with_extension(extension)
    }
}

/// Image identifier used in the tags table (file stem)
pub fn image_id(dicom_file: &Path) -> String {
    dicom_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
