//! Item sink trait and error types

use crate::model::Item;
use thiserror::Error;

/// Errors that can occur while persisting items
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Sequence number {sequence} does not follow {last}")]
    OutOfOrder { sequence: u64, last: u64 },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for append-only item stores
///
/// Implementations initialize their schema when constructed, before the first
/// `append`. Each successful `append` must be durable on its own: a crash
/// afterwards leaves every earlier record intact and readable.
pub trait ItemSink {
    /// Appends one item tagged with its 1-based sequence number
    fn append(&mut self, item: &Item, sequence: u64) -> SinkResult<()>;

    /// Called once after a run completes without a fatal error
    fn finish(&mut self, _items_collected: u64) -> SinkResult<()> {
        Ok(())
    }

    /// Called once after a run stopped on a fatal error
    ///
    /// Records already appended stay in place.
    fn fail(&mut self, _items_collected: u64) -> SinkResult<()> {
        Ok(())
    }
}

impl<T: ItemSink + ?Sized> ItemSink for Box<T> {
    fn append(&mut self, item: &Item, sequence: u64) -> SinkResult<()> {
        (**self).append(item, sequence)
    }

    fn finish(&mut self, items_collected: u64) -> SinkResult<()> {
        (**self).finish(items_collected)
    }

    fn fail(&mut self, items_collected: u64) -> SinkResult<()> {
        (**self).fail(items_collected)
    }
}

/// Rejects sequence numbers that do not strictly increase
pub(crate) fn check_sequence(last: u64, sequence: u64) -> SinkResult<()> {
    if sequence <= last {
        return Err(SinkError::OutOfOrder { sequence, last });
    }
    Ok(())
}
