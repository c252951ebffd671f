use clap::Parser;
use cxrprep_core::cli::{setup_logging, Cli};
use cxrprep_core::{CxrError, HttpEntityDetector, Pipeline, TextReport};
use log::{error, info, warn};
use std::process;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        if e.is_fatal() {
            error!("Invalid configuration: {}", e);
        } else {
            error!("{}", e);
        }
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CxrError> {
    if !cli.source_folder.is_dir() {
        return Err(CxrError::ConfigError(format!(
            "{} is not a directory",
            cli.source_folder.display()
        )));
    }

    let config = cli.to_config()?;
    if !config.stages.any() {
        warn!("No stages selected; only discovering cases");
    }

    let mut pipeline = Pipeline::new(config)?;
    if let Some(endpoint) = &cli.endpoint {
        info!("Using entity detection service at {}", endpoint);
        pipeline = pipeline.with_detector(Box::new(HttpEntityDetector::new(
            endpoint.as_str(),
            cli.timeout(),
        )?));
    }

    let report = pipeline.run()?;
    println!("{}", TextReport::new(&report));
    Ok(())
}
