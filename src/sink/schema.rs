//! Database schema definitions for the SQLite sink

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    handle TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    items_collected INTEGER NOT NULL DEFAULT 0
);

-- One row per collected item, in collection order
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    sequence INTEGER NOT NULL,
    item_id TEXT NOT NULL,
    account_id TEXT,
    account_handle TEXT,
    text TEXT,
    created_at TEXT,
    repost_count INTEGER,
    favorite_count INTEGER,
    view_count INTEGER,
    in_reply_to TEXT,
    media TEXT NOT NULL DEFAULT '',
    reply_count INTEGER,
    bookmark_count INTEGER,
    location TEXT,
    hashtags TEXT NOT NULL DEFAULT '',
    urls TEXT NOT NULL DEFAULT '',
    UNIQUE(run_id, sequence)
);

CREATE INDEX IF NOT EXISTS idx_items_run ON items(run_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
