use clap::Parser;
use cxrprep_core::cli::setup_logging;
use cxrprep_core::tables::{outer_join, Table, ID_COLUMN};
use cxrprep_core::Result;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool for joining two CSV tables on a shared key column
#[derive(Parser, Debug)]
#[command(name = "csvmerge")]
#[command(about = "Outer-join two CSV files on a key column")]
#[command(version)]
struct Cli {
    /// Left table
    #[arg(value_name = "IN1")]
    left: PathBuf,

    /// Right table
    #[arg(value_name = "IN2")]
    right: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "merged.csv")]
    output: PathBuf,

    /// Key column present in both tables
    #[arg(long, default_value = ID_COLUMN)]
    on: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match merge_files(&cli.left, &cli.right, &cli.output, &cli.on) {
        Ok(rows) => info!("Wrote {} rows to {}", rows, cli.output.display()),
        Err(e) => {
            error!("Failed to merge: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Joins `left` and `right` on `on` and writes the result, returning its row count
fn merge_files(left: &Path, right: &Path, output: &Path, on: &str) -> Result<usize> {
    let merged = outer_join(&Table::read_csv(left)?, &Table::read_csv(right)?, on)?;
    merged.write_csv(output)?;
    Ok(merged.rows().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_merge_files() {
        let dir = TempDir::new().unwrap();
        let left = dir.path().join("cases.csv");
        let right = dir.path().join("labels.csv");
        let output = dir.path().join("merged.csv");
        fs::write(&left, "ID,Report\nB,clear\nA,\"effusion, small\"\n").unwrap();
        fs::write(&right, "ID,effusion\nA,true\n").unwrap();

        let rows = merge_files(&left, &right, &output, "ID").unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "ID,Report,effusion\nA,\"effusion, small\",true\nB,clear,\n"
        );
    }

    #[test]
    fn test_missing_key_fails_without_output() {
        let dir = TempDir::new().unwrap();
        let left = dir.path().join("a.csv");
        let right = dir.path().join("b.csv");
        let output = dir.path().join("merged.csv");
        fs::write(&left, "ID,x\n1,2\n").unwrap();
        fs::write(&right, "Key,y\n1,3\n").unwrap();

        assert!(merge_files(&left, &right, &output, "ID").is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["csvmerge", "a.csv", "b.csv"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("merged.csv"));
        assert_eq!(cli.on, "ID");
    }
}
