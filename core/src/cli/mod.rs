pub mod report;

use crate::error::Result;
use crate::imaging::ImageTarget;
use crate::nlp::DEFAULT_TIMEOUT;
use crate::pipeline::{PipelineConfig, Stages};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for cxrprep
#[derive(Parser, Debug)]
#[command(name = "cxrprep")]
#[command(about = "Prepare de-identified chest X-ray cases: images, tags and report labels")]
#[command(version)]
pub struct Cli {
    /// Folder holding one sub-directory per case
    #[arg(value_name = "SOURCE_FOLDER")]
    pub source_folder: PathBuf,

    /// Output folder
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Worker pool size
    #[arg(short = 'p', long, default_value_t = 2)]
    pub workers: usize,

    /// Send each report to the entity detection service
    #[arg(long)]
    pub detect: bool,

    /// Collect detected entities into entities.csv
    #[arg(long)]
    pub entities: bool,

    /// Reduce entities to per-case labels and write labels.csv
    #[arg(long)]
    pub labels: bool,

    /// Convert DICOM images to raster files
    #[arg(long)]
    pub images: bool,

    /// Append DICOM tag values to tags.csv
    #[arg(long)]
    pub tags: bool,

    /// Append case rows to cases.csv
    #[arg(long)]
    pub csv: bool,

    /// Join cases.csv and labels.csv into master.csv
    #[arg(long)]
    pub merge: bool,

    /// Output image extension (jpg, jpeg or png)
    #[arg(long, default_value = "jpg")]
    pub ext: String,

    /// Output image width
    #[arg(long, default_value_t = 500)]
    pub width: u32,

    /// Output image height
    #[arg(long, default_value_t = 500)]
    pub height: u32,

    /// Entity detection service URL
    #[arg(long, env = "CXRPREP_NLP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Entity detection request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn stages(&self) -> Stages {
        Stages {
            detect: self.detect,
            entities: self.entities,
            labels: self.labels,
            images: self.images,
            tags: self.tags,
            cases_csv: self.csv,
            merge: self.merge,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the pipeline settings, rejecting an unsupported extension or size
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let target = ImageTarget::new(&self.ext, self.width, self.height)?;
        let config = PipelineConfig::new(&self.source_folder, &self.output)
            .with_workers(self.workers)
            .with_stages(self.stages())
            .with_image_target(target);
        config.validate()?;
        Ok(config)
    }
}

/// Initializes `env_logger` at `Info`, or `Debug` when verbose
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CxrError;
    use crate::types::ImageCodec;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cxrprep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["cases"]);
        let config = cli.to_config().unwrap();

        assert_eq!(config.source_folder, PathBuf::from("cases"));
        assert_eq!(config.output_folder, PathBuf::from("output"));
        assert_eq!(config.workers, 2);
        assert!(!config.stages.any());
        assert_eq!(config.image_target.codec, ImageCodec::Jpeg);
        assert_eq!(
            (config.image_target.width, config.image_target.height),
            (500, 500)
        );
        assert_eq!(cli.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_stage_flags() {
        let cli = parse(&["cases", "--images", "--csv", "-p", "8", "--ext", "PNG"]);
        let config = cli.to_config().unwrap();

        assert!(config.stages.images);
        assert!(config.stages.cases_csv);
        assert!(!config.stages.tags);
        assert_eq!(config.workers, 8);
        assert_eq!(config.image_target.codec, ImageCodec::Png);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let cli = parse(&["cases", "--ext", "bmp"]);
        assert!(matches!(cli.to_config(), Err(CxrError::UnsupportedCodec(_))));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let cli = parse(&["cases", "--width", "0"]);
        assert!(matches!(
            cli.to_config(),
            Err(CxrError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let cli = parse(&["cases", "-p", "0"]);
        assert!(matches!(cli.to_config(), Err(CxrError::ConfigError(_))));
    }
}
