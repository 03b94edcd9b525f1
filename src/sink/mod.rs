//! Sink module for persisting collected items
//!
//! This module handles the append-only output of a harvest:
//! - The `ItemSink` trait the collector writes through
//! - A CSV sink that reopens, appends, and syncs per record
//! - A SQLite sink that commits one insert per record and tracks runs

mod csv_sink;
mod schema;
mod sqlite_sink;
mod traits;

pub use csv_sink::CsvSink;
pub use sqlite_sink::{RunStatus, SqliteSink};
pub use traits::{ItemSink, SinkError, SinkResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Opens the configured sink for a handle, writing its header or schema
///
/// The output directory is created if it does not exist yet.
pub fn open_sink(
    output: &OutputConfig,
    handle: &str,
    config_hash: &str,
) -> SinkResult<Box<dyn ItemSink + Send>> {
    std::fs::create_dir_all(&output.directory)?;
    let path = output.path_for(handle);
    open_sink_at(output.format, &path, handle, config_hash)
}

fn open_sink_at(
    format: OutputFormat,
    path: &Path,
    handle: &str,
    config_hash: &str,
) -> SinkResult<Box<dyn ItemSink + Send>> {
    tracing::info!("Writing {:?} output to {}", format, path.display());
    match format {
        OutputFormat::Csv => Ok(Box::new(CsvSink::create(path)?)),
        OutputFormat::Sqlite => Ok(Box::new(SqliteSink::open(path, handle, config_hash)?)),
    }
}
