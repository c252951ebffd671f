//! Entity detection service boundary
//!
//! The service takes report text and answers with a JSON document holding an
//! `Entities` array. The raw answer is persisted per case so later stages
//! can run without calling the service again.

use crate::error::{CaseWarning, CxrError, Result};
use crate::types::{Case, DetectEntitiesResponse};
use log::warn;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default request timeout for [`HttpEntityDetector`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Detects clinical entities in free text
pub trait EntityDetector: Send + Sync {
    /// Returns the raw service response for `text`
    fn detect_entities(&self, text: &str) -> Result<serde_json::Value>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectEntitiesRequest<'a> {
    text: &'a str,
}

/// Entity detection over HTTP: POSTs `{"Text": ...}` and expects JSON back
pub struct HttpEntityDetector {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpEntityDetector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl EntityDetector for HttpEntityDetector {
    fn detect_entities(&self, text: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&DetectEntitiesRequest { text })
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }
}

/// Runs detection for one case and persists the raw result
///
/// The response is validated before it is written, so a malformed answer
/// leaves no artifact behind.
///
/// # Errors
///
/// Returns `EmptyReport` without calling the service if the report is blank,
/// `RemoteService` for a failed call, and `MalformedEntities` if the answer
/// lacks required fields.
pub fn detect_for_case(
    detector: &dyn EntityDetector,
    case: &Case,
) -> Result<DetectEntitiesResponse> {
    if case.report_text.trim().is_empty() {
        warn!(
            "{}",
            CaseWarning::MalformedCase {
                case_id: case.id.clone(),
                reason: "empty report".to_string(),
            }
        );
        return Err(CxrError::EmptyReport(case.id.clone()));
    }

    let raw = detector.detect_entities(&case.report_text)?;
    let response = DetectEntitiesResponse::from_value(&raw)?;

    fs::create_dir_all(&case.output_directory)?;
    persist_result(&raw, &case.entity_detection_path())?;
    Ok(response)
}

/// Writes a raw response as pretty-printed JSON
pub fn persist_result(raw: &serde_json::Value, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(raw)?)?;
    Ok(())
}

/// Loads a previously persisted response
pub fn load_result(path: &Path) -> Result<DetectEntitiesResponse> {
    DetectEntitiesResponse::from_json(&fs::read_to_string(path)?)
}

/// Loads a case's persisted response, or `None` if detection has not run yet
pub fn load_case_result(case: &Case) -> Result<Option<DetectEntitiesResponse>> {
    let path = case.entity_detection_path();
    if !path.exists() {
        return Ok(None);
    }
    load_result(&path).map(Some)
}
