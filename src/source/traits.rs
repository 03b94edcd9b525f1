//! Remote source trait and error types
//!
//! This module defines the interface the collector uses to talk to the
//! remote API, and the errors a fetch can end in.

use crate::model::{AccountId, Cursor, Page};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// The server asked us to back off until `reset_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSignal {
    pub reset_at: DateTime<Utc>,
}

/// Errors that can occur while talking to the remote source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Rate limited until {}", .0.reset_at)]
    RateLimited(RateLimitSignal),

    #[error("Account '{handle}' not found")]
    NotFound { handle: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for remote source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Trait for paginated remote sources
///
/// Both fetch operations may fail with [`SourceError::RateLimited`] instead
/// of returning a page; the caller decides whether to wait and retry.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Resolves an account handle to its identifier
    async fn resolve_account(&self, handle: &str) -> SourceResult<AccountId>;

    /// Fetches the newest page of an account's items
    async fn fetch_first_page(&self, account_id: &AccountId, page_size: u32) -> SourceResult<Page>;

    /// Fetches the page following `cursor`
    async fn fetch_next_page(&self, cursor: &Cursor) -> SourceResult<Page>;
}
