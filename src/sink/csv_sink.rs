//! CSV item sink
//!
//! The header row is written once when the sink is created. Every append
//! reopens the file in append mode, writes a single row, flushes, and syncs
//! it to disk before returning.

use crate::model::{Item, RECORD_HEADER};
use crate::sink::traits::{check_sequence, ItemSink, SinkError, SinkResult};
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Append-only CSV file sink
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    last_sequence: u64,
}

impl CsvSink {
    /// Creates (or truncates) the CSV file and writes the header row
    pub fn create(path: &Path) -> SinkResult<Self> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(RECORD_HEADER)?;
        sync(writer)?;

        tracing::debug!("Initialized CSV output at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ItemSink for CsvSink {
    fn append(&mut self, item: &Item, sequence: u64) -> SinkResult<()> {
        check_sequence(self.last_sequence, sequence)?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(item.to_record(sequence))?;
        sync(writer)?;

        self.last_sequence = sequence;
        Ok(())
    }
}

/// Flushes buffered rows and syncs the file contents to disk
fn sync(writer: csv::Writer<File>) -> SinkResult<()> {
    let file = writer
        .into_inner()
        .map_err(|e| SinkError::Io(e.into_error()))?;
    file.sync_data()?;
    Ok(())
}
