//! CSV tables written by the pipeline
//!
//! - [`Table`]: an in-memory string table read from or written to CSV
//! - [`CsvAppender`]: an append-only CSV file that writes its header once
//! - [`records`]: the fixed layouts of the tags, entities and cases tables
//! - [`outer_join`]: merges two tables on an identifier column

mod merge;
pub mod records;

pub use merge::outer_join;

use crate::error::{CxrError, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Default identifier column shared by the cases and labels tables
pub const ID_COLUMN: &str = "ID";

/// In-memory table of string cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a column by exact name
    ///
    /// # Errors
    ///
    /// Returns `ColumnNotFound` if no header matches
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CxrError::ColumnNotFound(name.to_string()))
    }

    /// Reads a CSV file whose first record is the header
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Writes the table to `path`, replacing any existing file
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Append-only CSV file
///
/// The header is written only when the file is new (or empty); an existing
/// file is appended to as is. The file is opened once and flushed by
/// [`CsvAppender::finish`].
pub struct CsvAppender {
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl CsvAppender {
    pub fn open<I, T>(path: &Path, header: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let is_new = std::fs::metadata(path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new().from_writer(file);
        if is_new {
            writer.write_record(header)?;
        }

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flushes and closes the file, returning the number of rows appended
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cases.csv");

        let table = Table::new(
            strings(&["ID", "Report"]),
            vec![
                strings(&["A", "Line one.\nLine two, with comma."]),
                strings(&["B", ""]),
            ],
        );
        table.write_csv(&path).unwrap();

        assert_eq!(Table::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn test_column_index() {
        let table = Table::new(strings(&["ID", "asthma"]), vec![]);
        assert_eq!(table.column_index("asthma").unwrap(), 1);
        assert!(matches!(
            table.column_index("Case ID"),
            Err(CxrError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_appender_writes_header_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tags.csv");

        let mut appender = CsvAppender::open(&path, ["Case ID", "Image ID"]).unwrap();
        appender.write_row(["A", "IM1"]).unwrap();
        assert_eq!(appender.finish().unwrap(), 1);

        let mut appender = CsvAppender::open(&path, ["Case ID", "Image ID"]).unwrap();
        appender.write_row(["B", "IM2"]).unwrap();
        appender.write_row(["B", "IM3"]).unwrap();
        assert_eq!(appender.finish().unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Case ID,Image ID\nA,IM1\nB,IM2\nB,IM3\n");
    }

    #[test]
    fn test_appender_empty_file_gets_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cases.csv");
        File::create(&path).unwrap();

        let appender = CsvAppender::open(&path, ["ID"]).unwrap();
        appender.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ID\n");
    }
}
