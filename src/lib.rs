//! Timeline Harvester: a paced collector for a single account's items
//!
//! This crate walks a paginated, rate-limited remote API for one account and
//! appends every item it receives to an append-only tabular store, one durable
//! record at a time.

pub mod collector;
pub mod config;
pub mod model;
pub mod session;
pub mod sink;
pub mod source;

use std::time::Duration;
use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Account not found: {handle}")]
    AccountNotFound { handle: String },

    #[error("Rate limit backoff exhausted: waited {waited:?}, limit is {limit:?}")]
    BackoffExhausted { waited: Duration, limit: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type HarvestResult<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use collector::{Collector, PacingPolicy, RunSummary, StopReason};
pub use config::Config;
pub use model::{AccountId, Cursor, Item, Page};
