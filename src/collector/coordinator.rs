//! Collector - the paginated collection loop
//!
//! This module contains the loop that coordinates one harvest:
//! - Resolving the target account
//! - Requesting pages in order, following the source's cursor
//! - Waiting out rate limits and retrying the identical request
//! - Pacing page requests with randomized delays
//! - Handing every item to the sink before moving on

use crate::collector::pacing::PacingPolicy;
use crate::collector::progress::{ProgressReporter, TracingReporter};
use crate::collector::summary::{RunSummary, StopReason};
use crate::model::{AccountId, Cursor, Page};
use crate::sink::ItemSink;
use crate::source::{RateLimitSignal, RemoteSource, SourceError};
use crate::{HarvestError, HarvestResult};
use chrono::{Duration as ChronoDuration, Utc};

/// Default number of items requested for the first page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A page request that can be replayed verbatim after a rate limit
#[derive(Debug, Clone)]
enum PageRequest {
    First { account_id: AccountId, page_size: u32 },
    Next { cursor: Cursor },
}

/// Drives one account's harvest from a remote source into a sink
///
/// The collector exclusively owns both ends for the duration of a run and
/// performs exactly one request or write at a time.
pub struct Collector<S, W> {
    source: S,
    sink: W,
    pacing: PacingPolicy,
    page_size: u32,
    reporter: Box<dyn ProgressReporter>,
}

impl<S: RemoteSource, W: ItemSink> Collector<S, W> {
    /// Creates a collector
    ///
    /// The sink must already have its header or schema written.
    pub fn new(source: S, sink: W, pacing: PacingPolicy) -> Self {
        Self {
            source,
            sink,
            pacing,
            page_size: DEFAULT_PAGE_SIZE,
            reporter: Box::new(TracingReporter),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_parts(self) -> (S, W) {
        (self.source, self.sink)
    }

    /// Runs the collection loop
    ///
    /// # Algorithm
    ///
    /// 1. Resolve the handle to an account id (not-found is fatal)
    /// 2. Request the first page without a cursor
    /// 3. For every later page, sleep an inter-page delay and request the
    ///    page after the current cursor
    /// 4. On a rate limit, sleep until the reset time and replay the same
    ///    request without touching the counter or cursor; a replayed next-page
    ///    request gets a fresh inter-page delay first
    /// 5. An empty page ends the run; otherwise each item is numbered and
    ///    appended to the sink in order
    /// 6. Stop once at least `minimum_items` are recorded or the source
    ///    returns no continuation cursor
    ///
    /// A `minimum_items` of zero or less performs no remote calls at all.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed; `items_collected` is the final count
    /// * `Err(HarvestError)` - A fatal resolution, transport, or persistence failure;
    ///   the sink is told via `ItemSink::fail`
    pub async fn run(&mut self, handle: &str, minimum_items: i64) -> HarvestResult<RunSummary> {
        self.reporter.run_started(handle, minimum_items);

        let mut summary = RunSummary::new();

        if minimum_items <= 0 {
            summary.stop_reason = StopReason::NothingRequested;
            return self.finish(summary);
        }

        match self.collect(handle, minimum_items as u64, &mut summary).await {
            Ok(()) => self.finish(summary),
            Err(e) => {
                if let Err(sink_error) = self.sink.fail(summary.items_collected) {
                    tracing::warn!("Could not mark the output as failed: {}", sink_error);
                }
                Err(e)
            }
        }
    }

    async fn collect(
        &mut self,
        handle: &str,
        minimum_items: u64,
        summary: &mut RunSummary,
    ) -> HarvestResult<()> {
        let account_id = self.resolve_account(handle, summary).await?;
        summary.account_id = Some(account_id.clone());

        let mut cursor: Option<Cursor> = None;

        while summary.items_collected < minimum_items {
            let page_number = summary.pages_fetched + 1;

            let request = match cursor.take() {
                None => {
                    self.reporter.page_requested(page_number, None);
                    PageRequest::First {
                        account_id: account_id.clone(),
                        page_size: self.page_size,
                    }
                }
                Some(cursor) => {
                    let delay = self.pacing.inter_page_delay();
                    self.reporter.page_requested(page_number, Some(delay));
                    tokio::time::sleep(delay).await;
                    PageRequest::Next { cursor }
                }
            };

            let page = self.fetch_page(&request, page_number, summary).await?;
            summary.pages_fetched += 1;

            if page.is_empty() {
                self.reporter
                    .page_received(page_number, 0, summary.items_collected);
                summary.stop_reason = StopReason::EmptyPage;
                break;
            }

            let Page { items, next_cursor } = page;
            for item in &items {
                let sequence = summary.items_collected + 1;
                self.sink.append(item, sequence)?;
                summary.items_collected = sequence;
            }

            self.reporter
                .page_received(page_number, items.len(), summary.items_collected);

            match next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    if summary.items_collected < minimum_items {
                        summary.stop_reason = StopReason::EndOfSequence;
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    fn finish(&mut self, summary: RunSummary) -> HarvestResult<RunSummary> {
        self.sink.finish(summary.items_collected)?;
        self.reporter.run_finished(&summary);
        Ok(summary)
    }

    /// Resolves the handle, waiting out any rate limits on the way
    async fn resolve_account(
        &mut self,
        handle: &str,
        summary: &mut RunSummary,
    ) -> HarvestResult<AccountId> {
        loop {
            let outcome = self.source.resolve_account(handle).await;
            match outcome {
                Ok(account_id) => {
                    tracing::debug!("Resolved @{} to account {}", handle, account_id);
                    return Ok(account_id);
                }
                Err(SourceError::RateLimited(signal)) => {
                    self.wait_out(signal, summary).await?;
                }
                Err(SourceError::NotFound { .. }) => {
                    return Err(HarvestError::AccountNotFound {
                        handle: handle.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Issues a page request, replaying it after every rate limit
    async fn fetch_page(
        &mut self,
        request: &PageRequest,
        page_number: u64,
        summary: &mut RunSummary,
    ) -> HarvestResult<Page> {
        loop {
            let outcome = match request {
                PageRequest::First {
                    account_id,
                    page_size,
                } => self.source.fetch_first_page(account_id, *page_size).await,
                PageRequest::Next { cursor } => self.source.fetch_next_page(cursor).await,
            };

            match outcome {
                Ok(page) => return Ok(page),
                Err(SourceError::RateLimited(signal)) => {
                    self.wait_out(signal, summary).await?;
                    match request {
                        PageRequest::First { .. } => {
                            self.reporter.page_requested(page_number, None);
                        }
                        PageRequest::Next { .. } => {
                            let delay = self.pacing.inter_page_delay();
                            self.reporter.page_requested(page_number, Some(delay));
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Sleeps until a rate limit resets
    ///
    /// Fails with `BackoffExhausted` instead of sleeping if the wait would
    /// push the run's total backoff past the configured cap.
    async fn wait_out(
        &mut self,
        signal: RateLimitSignal,
        summary: &mut RunSummary,
    ) -> HarvestResult<()> {
        let wait = self.pacing.rate_limit_delay(signal.reset_at);

        if let Some(limit) = self.pacing.max_total_backoff() {
            let waited = summary.total_backoff + wait;
            if waited > limit {
                return Err(HarvestError::BackoffExhausted { waited, limit });
            }
        }

        let resume_at =
            Utc::now() + ChronoDuration::from_std(wait).unwrap_or_else(|_| ChronoDuration::zero());
        self.reporter.rate_limited(resume_at, wait);
        tokio::time::sleep(wait).await;

        summary.rate_limit_waits += 1;
        summary.total_backoff += wait;
        Ok(())
    }
}
