//! Progress reporting side channel
//!
//! Reporters observe a run; they never influence it. Every method is
//! infallible, so a reporter cannot fail or abort a harvest.

use crate::collector::summary::RunSummary;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Observer for collection progress
pub trait ProgressReporter: Send {
    /// The run is starting
    fn run_started(&self, handle: &str, minimum_items: i64);

    /// A page request is about to be issued
    ///
    /// `delay` is the inter-page pause applied before it, if any. Retries
    /// after a rate limit report again with no delay.
    fn page_requested(&self, page_number: u64, delay: Option<Duration>);

    /// A rate limit is being waited out until `resume_at`
    fn rate_limited(&self, resume_at: DateTime<Utc>, wait: Duration);

    /// A page arrived and its items were persisted
    ///
    /// An empty page, which ends the run, is reported with zero items.
    fn page_received(&self, page_number: u64, items_on_page: usize, total_items: u64);

    /// The run finished without a fatal error
    fn run_finished(&self, summary: &RunSummary);
}

/// Reporter that emits `tracing` events
///
/// Timestamps come from the installed subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn run_started(&self, handle: &str, minimum_items: i64) {
        tracing::info!(handle, minimum_items, "Starting harvest of @{}", handle);
    }

    fn page_requested(&self, page_number: u64, delay: Option<Duration>) {
        match delay {
            Some(delay) => tracing::info!(
                page = page_number,
                delay_secs = delay.as_secs_f64(),
                "Getting next items after {:.1} seconds",
                delay.as_secs_f64()
            ),
            None => tracing::info!(page = page_number, "Getting items"),
        }
    }

    fn rate_limited(&self, resume_at: DateTime<Utc>, wait: Duration) {
        tracing::warn!(
            resume_at = %resume_at,
            wait_secs = wait.as_secs_f64(),
            "Rate limit reached. Waiting until {}",
            resume_at
        );
    }

    fn page_received(&self, page_number: u64, items_on_page: usize, total_items: u64) {
        if items_on_page == 0 {
            tracing::info!(page = page_number, total_items, "No more items found");
            return;
        }
        tracing::info!(
            page = page_number,
            items_on_page,
            total_items,
            "Got {} items",
            total_items
        );
    }

    fn run_finished(&self, summary: &RunSummary) {
        tracing::info!(
            total_items = summary.items_collected,
            pages = summary.pages_fetched,
            stop_reason = %summary.stop_reason,
            "Done! Got {} items",
            summary.items_collected
        );
    }
}
