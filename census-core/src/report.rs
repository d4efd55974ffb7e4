//! Tabular output
//!
//! The scanner only sees [`ReportSink`]; the CSV implementation writes a
//! comma-separated table with minimal quoting and empty fields for nulls.

use crate::decoder::{Encoding, decode_file};
use crate::error::{ScanError, ScanResult};
use crate::record::StatusRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Destination for scan rows
pub trait ReportSink {
    fn write_header(&mut self, columns: &[String]) -> ScanResult<()>;
    fn write_record(&mut self, record: &StatusRecord) -> ScanResult<()>;
    fn flush(&mut self) -> ScanResult<()>;
}

/// CSV table over any writer
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReport<File> {
    /// Open `path`, truncating it unless `append` is set
    pub fn create(path: &Path, append: bool) -> ScanResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| ScanError::from_io(path, e))?;
        debug!("Opened report {:?} (append: {})", path, append);
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvReport<W> {
    pub fn from_writer(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote_style(csv::QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(writer);
        Self { writer }
    }

    pub fn into_inner(self) -> ScanResult<W> {
        self.writer.into_inner().map_err(|e| ScanError::report(e.error()))
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn write_header(&mut self, columns: &[String]) -> ScanResult<()> {
        self.writer.write_record(columns).map_err(ScanError::report)
    }

    fn write_record(&mut self, record: &StatusRecord) -> ScanResult<()> {
        self.writer
            .write_record(record.values().map(|v| v.unwrap_or("")))
            .map_err(ScanError::report)
    }

    fn flush(&mut self) -> ScanResult<()> {
        self.writer.flush().map_err(ScanError::report)
    }
}

/// A table read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read a table written by a previous scan, trying each candidate encoding
pub fn read_table(path: &Path, encodings: &[Encoding]) -> ScanResult<Table> {
    let text = decode_file(path, encodings)?.render();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());

    let headers = reader.headers().map_err(ScanError::report)?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|row| row.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()
        .map_err(ScanError::report)?;

    Ok(Table { headers, rows })
}
