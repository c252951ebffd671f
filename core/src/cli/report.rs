use crate::pipeline::BatchReport;
use std::fmt;

/// Text report formatter for a pipeline run
pub struct TextReport<'a> {
    report: &'a BatchReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a BatchReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Summary")?;
        writeln!(f, "=============")?;
        writeln!(f)?;
        writeln!(f, "Cases found:    {}", self.report.cases_found)?;

        if self.report.stages.is_empty() {
            writeln!(f, "No stages run")?;
            return Ok(());
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:<18} {:>9} {:>9} {:>7} {:>10}",
            "Stage", "Attempted", "Succeeded", "Failed", "Time"
        )?;
        writeln!(f, "{}", "-".repeat(57))?;
        for stage in &self.report.stages {
            writeln!(
                f,
                "{:<18} {:>9} {:>9} {:>7} {:>9.2}s",
                stage.stage.to_string(),
                stage.attempted,
                stage.succeeded,
                stage.failed(),
                stage.elapsed.as_secs_f64()
            )?;
            if let Some(slowest) = stage.slowest_case() {
                writeln!(
                    f,
                    "  slowest case: {} ({:.2}s)",
                    slowest.case_id,
                    slowest.elapsed.as_secs_f64()
                )?;
            }
        }

        Ok(())
    }
}
