//! SQLite item sink
//!
//! Each harvest creates a row in `runs`; every appended item is its own
//! committed insert into `items`, so the database holds every record that was
//! acknowledged before an interruption.

use crate::model::{Item, LIST_SEPARATOR};
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{check_sequence, ItemSink, SinkResult};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// SQLite-backed item sink
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
    last_sequence: u64,
}

impl SqliteSink {
    /// Opens (or creates) the database, initializes the schema, and starts a run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `handle` - The account handle being harvested
    /// * `config_hash` - Hash of the configuration used for this run
    pub fn open(path: &Path, handle: &str, config_hash: &str) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, handle, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(handle: &str) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, handle, "test_hash")
    }

    fn with_connection(conn: Connection, handle: &str, config_hash: &str) -> SinkResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (handle, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                handle,
                now_string(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = conn.last_insert_rowid();

        tracing::debug!("Started SQLite run {}", run_id);

        Ok(Self {
            conn,
            run_id,
            last_sequence: 0,
        })
    }

    fn close_run(&self, status: RunStatus, items_collected: u64) -> SinkResult<()> {
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, items_collected = ?3 WHERE id = ?4",
            params![
                now_string(),
                status.to_db_string(),
                items_collected as i64,
                self.run_id
            ],
        )?;
        tracing::debug!("Closed SQLite run {} as {}", self.run_id, status.to_db_string());
        Ok(())
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Reads back the status of this sink's run
    pub fn run_status(&self) -> SinkResult<Option<RunStatus>> {
        let status: String = self.conn.query_row(
            "SELECT status FROM runs WHERE id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(RunStatus::from_db_string(&status))
    }

    /// Counts the items recorded for this sink's run
    pub fn count_items(&self) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl ItemSink for SqliteSink {
    fn append(&mut self, item: &Item, sequence: u64) -> SinkResult<()> {
        check_sequence(self.last_sequence, sequence)?;

        self.conn.execute(
            "INSERT INTO items (
                run_id, sequence, item_id, account_id, account_handle, text, created_at,
                repost_count, favorite_count, view_count, in_reply_to, media,
                reply_count, bookmark_count, location, hashtags, urls
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                self.run_id,
                sequence as i64,
                item.id,
                item.account.id,
                item.account.handle,
                item.text,
                item.created_at
                    .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
                item.repost_count.map(|v| v as i64),
                item.favorite_count.map(|v| v as i64),
                item.view_count.map(|v| v as i64),
                item.in_reply_to,
                item.media.join(LIST_SEPARATOR),
                item.reply_count.map(|v| v as i64),
                item.bookmark_count.map(|v| v as i64),
                item.location,
                item.hashtags.join(LIST_SEPARATOR),
                item.urls.join(LIST_SEPARATOR),
            ],
        )?;

        self.last_sequence = sequence;
        Ok(())
    }

    fn finish(&mut self, items_collected: u64) -> SinkResult<()> {
        self.close_run(RunStatus::Completed, items_collected)
    }

    fn fail(&mut self, items_collected: u64) -> SinkResult<()> {
        self.close_run(RunStatus::Failed, items_collected)
    }
}

fn now_string() -> String {
    Utc::now().to_rfc3339()
}
