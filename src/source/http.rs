//! HTTP remote source
//!
//! Talks to the remote JSON API with reqwest. The client shares the session's
//! cookie store, so every request carries the session cookies. The endpoints are:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | resolve account | `GET users/by-handle/{handle}` → `{"id": ...}` |
//! | first page | `GET users/{id}/items?count={n}` → page |
//! | next page | `GET items?cursor={cursor}` → page |
//!
//! A page is `{"items": [...], "next_cursor": "..." | null}`.
//!
//! # Status Handling
//!
//! | Condition | Result |
//! |-----------|--------|
//! | HTTP 429 | `RateLimited`, reset from `x-rate-limit-reset` |
//! | HTTP 404 on resolve | `NotFound` |
//! | Other non-2xx | `Status` |
//! | Bad JSON | `Decode` |

use crate::config::SourceConfig;
use crate::model::{AccountId, Cursor, Page};
use crate::session::Session;
use crate::source::traits::{RateLimitSignal, RemoteSource, SourceError, SourceResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Header carrying the Unix timestamp at which the rate limit window resets
pub const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// Fallback wait when a 429 carries no reset information
const DEFAULT_RATE_LIMIT_WAIT_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: AccountId,
}

/// Remote source backed by the HTTP API
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Builds a source for the configured API using an authenticated session
    ///
    /// # Arguments
    ///
    /// * `config` - The remote source configuration
    /// * `session` - Session whose cookie store the client reads and updates
    pub fn new(config: &SourceConfig, session: &Session) -> SourceResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_provider(session.cookie_provider())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url()?,
        })
    }

    /// Sends a GET request and decodes a JSON body, classifying failures
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SourceResult<T> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = rate_limit_reset(&response, Utc::now());
            return Err(SourceError::RateLimited(RateLimitSignal { reset_at }));
        }

        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SourceError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn resolve_account(&self, handle: &str) -> SourceResult<AccountId> {
        let url = self.base_url.join(&format!("users/by-handle/{}", handle))?;

        match self.get_json::<AccountRecord>(url).await {
            Ok(record) => Ok(record.id),
            Err(SourceError::Status { status: 404, .. }) => Err(SourceError::NotFound {
                handle: handle.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn fetch_first_page(&self, account_id: &AccountId, page_size: u32) -> SourceResult<Page> {
        let mut url = self.base_url.join(&format!("users/{}/items", account_id))?;
        url.query_pairs_mut()
            .append_pair("count", &page_size.to_string());
        self.get_json(url).await
    }

    async fn fetch_next_page(&self, cursor: &Cursor) -> SourceResult<Page> {
        let mut url = self.base_url.join("items")?;
        url.query_pairs_mut().append_pair("cursor", cursor.as_str());
        self.get_json(url).await
    }
}

/// Works out when a rate limit lifts from a 429 response
///
/// Prefers the absolute `x-rate-limit-reset` timestamp, then a relative
/// `Retry-After` in seconds, then a fixed default wait.
fn rate_limit_reset(response: &Response, now: DateTime<Utc>) -> DateTime<Utc> {
    let header_i64 = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(reset) = header_i64(RATE_LIMIT_RESET_HEADER)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    {
        return reset;
    }

    if let Some(secs) = header_i64(RETRY_AFTER.as_str()) {
        return now + ChronoDuration::seconds(secs.max(0));
    }

    now + ChronoDuration::seconds(DEFAULT_RATE_LIMIT_WAIT_SECS)
}
