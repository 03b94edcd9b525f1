//! Run summary returned by the collector

use crate::model::AccountId;
use std::fmt;
use std::time::Duration;

/// Why a run stopped collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The minimum item count was reached
    #[default]
    TargetReached,

    /// The source returned a page with no items
    EmptyPage,

    /// The source returned items but no continuation cursor
    EndOfSequence,

    /// The minimum item count was zero or negative, nothing was fetched
    NothingRequested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TargetReached => "target reached",
            Self::EmptyPage => "no more items",
            Self::EndOfSequence => "end of sequence",
            Self::NothingRequested => "nothing requested",
        };
        f.write_str(text)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// The resolved account, if resolution happened
    pub account_id: Option<AccountId>,

    /// Final item count; also the last sequence number handed to the sink
    pub items_collected: u64,

    /// Number of page requests that returned a page (including the empty one)
    pub pages_fetched: u64,

    /// Number of rate-limit signals waited out
    pub rate_limit_waits: u32,

    /// Total time spent waiting out rate limits
    pub total_backoff: Duration,

    pub stop_reason: StopReason,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(handle: &str, summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");
    println!("  Handle: @{}", handle);
    if let Some(account_id) = &summary.account_id {
        println!("  Account ID: {}", account_id);
    }
    println!("  Items collected: {}", summary.items_collected);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!(
        "  Rate-limit waits: {} ({:.0}s total)",
        summary.rate_limit_waits,
        summary.total_backoff.as_secs_f64()
    );
    println!("  Stopped: {}", summary.stop_reason);
}
