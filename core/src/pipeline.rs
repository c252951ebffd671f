//! Per-case processing pipeline
//!
//! Stages run in a fixed order, each one optional:
//! detect entities → entities table → labels → images/tags → cases table → merge.
//!
//! Per-case work runs on a fixed-size worker pool. Workers share no mutable
//! state; each returns its case's outcome and the driver writes batch-wide
//! tables once all cases are done. A failing case is logged and counted,
//! never aborting the batch. Stages read only artifacts persisted by earlier
//! runs, so each can run on its own.

use crate::discovery::discover_cases;
use crate::error::{CxrError, Result};
use crate::extraction::extract_tag_values;
use crate::imaging::{convert, DicomImage, ImageTarget};
use crate::labels::{reduce_entities, LabelTable};
use crate::nlp::{detect_for_case, load_case_result, EntityDetector};
use crate::tables::records::{
    case_row, cases_header, entities_header, entity_row, tag_row, tags_header, CASES_FILENAME,
    ENTITIES_FILENAME, MASTER_FILENAME, TAGS_FILENAME,
};
use crate::tables::{outer_join, CsvAppender, Table, ID_COLUMN};
use crate::types::{image_id, Case, LabelMap, LABELS_FILENAME};
use dicom_dictionary_std::tags;
use dicom_object::{open_file, DefaultDicomObject, OpenFileOptions};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Which stages a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stages {
    pub detect: bool,
    pub entities: bool,
    pub labels: bool,
    pub images: bool,
    pub tags: bool,
    pub cases_csv: bool,
    pub merge: bool,
}

impl Stages {
    pub fn any(&self) -> bool {
        self.detect
            || self.entities
            || self.labels
            || self.images
            || self.tags
            || self.cases_csv
            || self.merge
    }
}

/// Settings for a pipeline run
///
/// # Example
///
/// ```
/// use cxrprep_core::pipeline::{PipelineConfig, Stages};
/// use cxrprep_core::imaging::ImageTarget;
///
/// let config = PipelineConfig::new("cases", "output")
///     .with_workers(4)
///     .with_stages(Stages { images: true, tags: true, ..Stages::default() })
///     .with_image_target(ImageTarget::new("png", 256, 256).unwrap());
///
/// assert_eq!(config.workers, 4);
/// assert!(config.stages.images);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source_folder: PathBuf,
    pub output_folder: PathBuf,
    /// Worker pool size
    pub workers: usize,
    pub stages: Stages,
    pub image_target: ImageTarget,
}

impl PipelineConfig {
    pub fn new(source_folder: impl Into<PathBuf>, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            source_folder: source_folder.into(),
            output_folder: output_folder.into(),
            workers: 2,
            stages: Stages::default(),
            image_target: ImageTarget::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_stages(mut self, stages: Stages) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_image_target(mut self, image_target: ImageTarget) -> Self {
        self.image_target = image_target;
        self
    }

    /// Checks settings that would fail every case
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CxrError::ConfigError(
                "worker pool size must be at least 1".to_string(),
            ));
        }
        if self.image_target.width == 0 || self.image_target.height == 0 {
            return Err(CxrError::InvalidDimensions {
                width: self.image_target.width,
                height: self.image_target.height,
            });
        }
        Ok(())
    }

    fn output_file(&self, name: &str) -> PathBuf {
        self.output_folder.join(name)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(".", "output")
    }
}

/// Pipeline stage, as reported in the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    DetectEntities,
    CollectEntities,
    GenerateLabels,
    ConvertDicoms,
    WriteCases,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DetectEntities => "detect entities",
            Stage::CollectEntities => "collect entities",
            Stage::GenerateLabels => "generate labels",
            Stage::ConvertDicoms => "convert dicoms",
            Stage::WriteCases => "write cases",
            Stage::Merge => "merge",
        };
        write!(f, "{}", name)
    }
}

/// Time spent on one case within a stage
#[derive(Debug, Clone, PartialEq)]
pub struct CaseTiming {
    pub case_id: String,
    pub elapsed: Duration,
    pub succeeded: bool,
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: Stage,
    pub attempted: usize,
    pub succeeded: usize,
    pub elapsed: Duration,
    /// Per-case timings, in case order; empty for stages that work on whole tables
    pub cases: Vec<CaseTiming>,
}

impl StageSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn slowest_case(&self) -> Option<&CaseTiming> {
        self.cases.iter().max_by_key(|c| c.elapsed)
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub cases_found: usize,
    pub stages: Vec<StageSummary>,
}

impl BatchReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Whether every attempted unit of work in every stage succeeded
    pub fn is_clean(&self) -> bool {
        self.stages.iter().all(|s| s.failed() == 0)
    }
}

/// Image conversion/tag extraction result of one case
#[derive(Debug, Default)]
struct CaseConversion {
    tag_rows: Vec<Vec<String>>,
    failures: usize,
}

/// Result of a per-case task and how long it took
struct CaseOutcome<T> {
    result: Result<T>,
    elapsed: Duration,
}

impl<T> CaseOutcome<T> {
    fn timing(&self, case: &Case, succeeded: bool) -> CaseTiming {
        CaseTiming {
            case_id: case.id.clone(),
            elapsed: self.elapsed,
            succeeded,
        }
    }
}

fn progress_bar(stage: Stage, len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map(|style| style.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let pb = ProgressBar::new(len as u64).with_style(style);
    pb.set_message(stage.to_string());
    pb
}

fn log_case_done(stage: Stage, case_id: &str, elapsed: Duration) {
    match stage {
        Stage::DetectEntities => info!("Detected entities for {} in {:?}", case_id, elapsed),
        Stage::ConvertDicoms => info!("Converted {} in {:?}", case_id, elapsed),
        _ => debug!("Finished {} for {} in {:?}", stage, case_id, elapsed),
    }
}

/// Runs the configured stages over every case of a source folder
pub struct Pipeline {
    config: PipelineConfig,
    detector: Option<Box<dyn EntityDetector>>,
    pool: rayon::ThreadPool,
}

impl Pipeline {
    /// Validates `config` and builds the worker pool
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| CxrError::ConfigError(format!("failed to build worker pool: {}", e)))?;

        Ok(Self {
            config,
            detector: None,
            pool,
        })
    }

    /// Sets the entity detection service used by the detect stage
    pub fn with_detector(mut self, detector: Box<dyn EntityDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Runs every enabled stage
    ///
    /// # Errors
    ///
    /// Only run-level problems are returned: missing detector for the detect
    /// stage, unreadable source folder, or batch tables that cannot be
    /// written. Per-case failures are counted in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let stages = self.config.stages;
        if stages.detect && self.detector.is_none() {
            return Err(CxrError::ConfigError(
                "entity detection requested but no service endpoint configured".to_string(),
            ));
        }

        fs::create_dir_all(&self.config.output_folder)?;
        let mut cases = discover_cases(&self.config.source_folder, &self.config.output_folder)?;
        info!(
            "Found {} cases in {}",
            cases.len(),
            self.config.source_folder.display()
        );

        let mut report = BatchReport {
            cases_found: cases.len(),
            stages: Vec::new(),
        };

        if stages.detect {
            report.stages.push(self.detect_entities(&cases)?);
        }
        if stages.entities {
            report.stages.push(self.collect_entities(&cases)?);
        }
        if stages.labels {
            report.stages.push(self.generate_labels(&mut cases)?);
        }
        if stages.images || stages.tags {
            report.stages.push(self.convert_dicoms(&cases)?);
        }
        if stages.cases_csv {
            report.stages.push(self.write_cases(&cases)?);
        }
        if stages.merge {
            report.stages.push(self.merge()?);
        }

        Ok(report)
    }

    /// Runs `task` for every case on the worker pool, timing and logging each
    /// case as it completes; outcomes keep case order
    fn for_each_case<T, F>(&self, stage: Stage, cases: &[Case], task: F) -> Vec<CaseOutcome<T>>
    where
        T: Send,
        F: Fn(&Case) -> Result<T> + Sync,
    {
        let progress = progress_bar(stage, cases.len());
        let outcomes = self.pool.install(|| {
            cases
                .par_iter()
                .progress_with(progress.clone())
                .map(|case| {
                    let start = Instant::now();
                    let result = task(case);
                    let elapsed = start.elapsed();
                    match &result {
                        Ok(_) => log_case_done(stage, &case.id, elapsed),
                        Err(e) => error!("Failed to {} for {}: {}", stage, case.id, e),
                    }
                    CaseOutcome { result, elapsed }
                })
                .collect()
        });
        progress.finish_and_clear();
        outcomes
    }

    fn detect_entities(&self, cases: &[Case]) -> Result<StageSummary> {
        let detector = self.detector.as_deref().ok_or_else(|| {
            CxrError::ConfigError("no entity detection service configured".to_string())
        })?;
        let start = Instant::now();

        let outcomes = self.for_each_case(Stage::DetectEntities, cases, |case| {
            let response = detect_for_case(detector, case)?;
            debug!("{} entities in report of {}", response.entities.len(), case.id);
            Ok(())
        });

        let timings: Vec<CaseTiming> = cases
            .iter()
            .zip(&outcomes)
            .map(|(case, outcome)| outcome.timing(case, outcome.result.is_ok()))
            .collect();

        let elapsed = start.elapsed();
        info!(
            "Detecting entities for {} cases took {:?}",
            cases.len(),
            elapsed
        );
        Ok(StageSummary {
            stage: Stage::DetectEntities,
            attempted: cases.len(),
            succeeded: timings.iter().filter(|t| t.succeeded).count(),
            elapsed,
            cases: timings,
        })
    }

    fn collect_entities(&self, cases: &[Case]) -> Result<StageSummary> {
        let start = Instant::now();
        let mut rows = Vec::new();
        let mut succeeded = 0;

        for case in cases {
            match load_case_result(case) {
                Ok(Some(response)) => {
                    rows.extend(response.entities.iter().map(|e| entity_row(&case.id, e)));
                    succeeded += 1;
                }
                Ok(None) => warn!("No entity detection result for {}, skipping", case.id),
                Err(e) => error!("Failed to read entities for {}: {}", case.id, e),
            }
        }

        let path = self.config.output_file(ENTITIES_FILENAME);
        Table::new(entities_header(), rows).write_csv(&path)?;
        info!("Wrote {}", path.display());

        Ok(StageSummary {
            stage: Stage::CollectEntities,
            attempted: cases.len(),
            succeeded,
            elapsed: start.elapsed(),
            cases: Vec::new(),
        })
    }

    fn generate_labels(&self, cases: &mut [Case]) -> Result<StageSummary> {
        let start = Instant::now();

        let outcomes = self.for_each_case(Stage::GenerateLabels, cases, |case| {
            Ok(load_case_result(case)?.map(|response| reduce_entities(&response.entities)))
        });

        let mut labelled: Vec<(String, LabelMap)> = Vec::new();
        let mut timings = Vec::with_capacity(cases.len());
        for (case, outcome) in cases.iter_mut().zip(outcomes) {
            let before = labelled.len();
            match &outcome.result {
                Ok(Some(labels)) => {
                    case.labels = labels.clone();
                    match write_case_labels(case) {
                        Ok(()) => labelled.push((case.id.clone(), case.labels.clone())),
                        Err(e) => error!("Failed to write labels for {}: {}", case.id, e),
                    }
                }
                Ok(None) => warn!(
                    "No entity detection result for {}, not labelled",
                    case.id
                ),
                Err(_) => {}
            }
            timings.push(outcome.timing(case, labelled.len() > before));
        }

        let table = LabelTable::unify(labelled.iter().map(|(id, labels)| (id.as_str(), labels)));
        let path = self.config.output_file(LABELS_FILENAME);
        table.to_table().write_csv(&path)?;
        info!(
            "Wrote {} with {} diagnoses for {} cases",
            path.display(),
            table.columns().len(),
            table.rows().len()
        );

        Ok(StageSummary {
            stage: Stage::GenerateLabels,
            attempted: cases.len(),
            succeeded: labelled.len(),
            elapsed: start.elapsed(),
            cases: timings,
        })
    }

    fn convert_dicoms(&self, cases: &[Case]) -> Result<StageSummary> {
        let start = Instant::now();
        let outcomes = self.for_each_case(Stage::ConvertDicoms, cases, |case| {
            self.convert_case(case)
        });

        let mut appender = if self.config.stages.tags {
            Some(CsvAppender::open(
                &self.config.output_file(TAGS_FILENAME),
                tags_header(),
            )?)
        } else {
            None
        };

        let mut timings = Vec::with_capacity(cases.len());
        for (case, outcome) in cases.iter().zip(&outcomes) {
            let succeeded = match &outcome.result {
                Ok(conversion) => {
                    if let Some(appender) = appender.as_mut() {
                        for row in &conversion.tag_rows {
                            appender.write_row(row)?;
                        }
                    }
                    conversion.failures == 0
                }
                Err(_) => false,
            };
            timings.push(outcome.timing(case, succeeded));
        }

        if let Some(appender) = appender {
            let rows = appender.finish()?;
            info!("Appended {} rows to {}", rows, TAGS_FILENAME);
        }

        let elapsed = start.elapsed();
        info!("Converting {} cases took {:?}", cases.len(), elapsed);
        Ok(StageSummary {
            stage: Stage::ConvertDicoms,
            attempted: cases.len(),
            succeeded: timings.iter().filter(|t| t.succeeded).count(),
            elapsed,
            cases: timings,
        })
    }

    /// Converts every image of a case; a bad image is logged and counted
    fn convert_case(&self, case: &Case) -> Result<CaseConversion> {
        let stages = self.config.stages;
        if stages.images {
            fs::create_dir_all(&case.output_directory)?;
        }

        let mut conversion = CaseConversion::default();
        for dicom_file in &case.dicom_files {
            let opened = if stages.images {
                open_file(dicom_file)
            } else {
                OpenFileOptions::new()
                    .read_until(tags::PIXEL_DATA)
                    .open_file(dicom_file)
            };
            let dcm = match opened {
                Ok(dcm) => dcm,
                Err(e) => {
                    error!("Failed to read {}: {}", dicom_file.display(), e);
                    conversion.failures += 1;
                    continue;
                }
            };

            if stages.tags {
                let id = image_id(dicom_file);
                let values = extract_tag_values(&dcm, &id);
                conversion.tag_rows.push(tag_row(&case.id, &id, &values));
            }

            if stages.images {
                if let Err(e) = self.write_image(case, dicom_file, &dcm) {
                    error!(
                        "Failed to convert {} for {}: {}",
                        dicom_file.display(),
                        case.id,
                        e
                    );
                    conversion.failures += 1;
                }
            }
        }

        Ok(conversion)
    }

    fn write_image(&self, case: &Case, dicom_file: &Path, dcm: &DefaultDicomObject) -> Result<()> {
        let target = &self.config.image_target;
        let image = DicomImage::from_dicom(dcm)?;
        let encoded = convert(&image, target)?;
        fs::write(
            case.image_output_path(dicom_file, &target.extension),
            &encoded.bytes,
        )?;
        Ok(())
    }

    fn write_cases(&self, cases: &[Case]) -> Result<StageSummary> {
        let start = Instant::now();
        let path = self.config.output_file(CASES_FILENAME);

        let mut appender = CsvAppender::open(&path, cases_header())?;
        for case in cases {
            appender.write_row(case_row(case, &self.config.source_folder))?;
        }
        let rows = appender.finish()?;
        info!("Appended {} cases to {}", rows, path.display());

        Ok(StageSummary {
            stage: Stage::WriteCases,
            attempted: cases.len(),
            succeeded: rows,
            elapsed: start.elapsed(),
            cases: Vec::new(),
        })
    }

    fn merge(&self) -> Result<StageSummary> {
        let start = Instant::now();
        let cases_path = self.config.output_file(CASES_FILENAME);
        let labels_path = self.config.output_file(LABELS_FILENAME);

        let mut summary = StageSummary {
            stage: Stage::Merge,
            attempted: 1,
            succeeded: 0,
            elapsed: Duration::ZERO,
            cases: Vec::new(),
        };

        if !cases_path.exists() || !labels_path.exists() {
            warn!(
                "Skipping merge: {} and {} must both exist",
                cases_path.display(),
                labels_path.display()
            );
        } else {
            let merged = outer_join(
                &Table::read_csv(&cases_path)?,
                &Table::read_csv(&labels_path)?,
                ID_COLUMN,
            )?;
            let path = self.config.output_file(MASTER_FILENAME);
            merged.write_csv(&path)?;
            info!("Wrote {} with {} rows", path.display(), merged.rows().len());
            summary.succeeded = 1;
        }

        summary.elapsed = start.elapsed();
        Ok(summary)
    }
}

/// Writes a case's own label table into its output directory
fn write_case_labels(case: &Case) -> Result<()> {
    fs::create_dir_all(&case.output_directory)?;
    LabelTable::from_cases(std::slice::from_ref(case))
        .to_table()
        .write_csv(&case.labels_path())
}
