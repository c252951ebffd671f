//! Case folder discovery
//!
//! Every sub-directory of the source folder is one case, named after the
//! directory. Inside it, `.dcm`/`.dicom` files are images and the first
//! `.txt` file (by name) is the report.

use crate::error::{CaseWarning, Result};
use crate::types::Case;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Finds all cases under `source`, sorted by case id
///
/// Per-case output directories are placed under `output` but not created.
/// A case without a report or without images is still returned; the
/// condition is logged as a warning.
///
/// # Errors
///
/// Returns an error if `source` or one of its sub-directories cannot be listed.
pub fn discover_cases(source: &Path, output: &Path) -> Result<Vec<Case>> {
    let mut case_dirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if path.is_dir() {
            case_dirs.push(path);
        } else {
            debug!("Skipping non-directory {}", path.display());
        }
    }
    case_dirs.sort();

    let mut cases = Vec::with_capacity(case_dirs.len());
    for case_dir in case_dirs {
        let id = match case_dir.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        cases.push(read_case(&id, &case_dir, &output.join(&id))?);
    }

    Ok(cases)
}

fn read_case(id: &str, case_dir: &Path, output_directory: &Path) -> Result<Case> {
    let mut files: Vec<PathBuf> = fs::read_dir(case_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let dicom_files: Vec<PathBuf> = files.iter().filter(|p| is_dicom_path(p)).cloned().collect();
    let reports: Vec<&PathBuf> = files.iter().filter(|p| has_extension(p, "txt")).collect();

    if reports.len() > 1 {
        warn!(
            "Case {} has {} reports, using {}",
            id,
            reports.len(),
            reports[0].display()
        );
    }

    let report_text = match reports.first() {
        Some(path) => read_report(path).unwrap_or_else(|e| {
            warn!("Failed to read report {}: {}", path.display(), e);
            String::new()
        }),
        None => {
            warn!(
                "{}",
                CaseWarning::MalformedCase {
                    case_id: id.to_string(),
                    reason: "no report".to_string(),
                }
            );
            String::new()
        }
    };

    if dicom_files.is_empty() {
        warn!(
            "{}",
            CaseWarning::MalformedCase {
                case_id: id.to_string(),
                reason: "no DICOM images".to_string(),
            }
        );
    }

    Ok(Case::new(
        id,
        case_dir.to_path_buf(),
        output_directory.to_path_buf(),
        dicom_files,
        report_text,
    ))
}

/// Reads a report, replacing invalid UTF-8 rather than failing
fn read_report(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_dicom_path(path: &Path) -> bool {
    has_extension(path, "dcm") || has_extension(path, "dicom")
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
