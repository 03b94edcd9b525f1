//! Collector module for paginated harvesting
//!
//! This module contains the collection engine, including:
//! - The pagination loop with rate-limit retry
//! - Jittered pacing between page requests
//! - Progress reporting as a side channel
//! - The summary of a finished run

mod coordinator;
mod pacing;
mod progress;
mod summary;

pub use coordinator::{Collector, DEFAULT_PAGE_SIZE};
pub use pacing::PacingPolicy;
pub use progress::{ProgressReporter, TracingReporter};
pub use summary::{print_summary, RunSummary, StopReason};

use crate::config::Config;
use crate::session::{FileSessionProvider, SessionProvider};
use crate::sink::open_sink;
use crate::source::HttpSource;
use crate::HarvestResult;

/// Runs a complete harvest from configuration
///
/// This is the main entry point for a run. It will:
/// 1. Obtain a session (saved or freshly logged in)
/// 2. Build the HTTP source
/// 3. Open the output sink and write its header
/// 4. Run the collection loop for the configured handle
///
/// # Arguments
///
/// * `config` - The harvester configuration, with any CLI overrides applied
/// * `config_hash` - Hash of the configuration file, recorded by SQLite output
/// * `relogin` - Ignore a saved session and log in again
pub async fn harvest(
    config: &Config,
    config_hash: &str,
    relogin: bool,
) -> HarvestResult<RunSummary> {
    let session = FileSessionProvider::new(&config.session, &config.source)?
        .force_login(relogin)
        .authenticate()
        .await?;

    let source = HttpSource::new(&config.source, &session)?;
    let sink = open_sink(&config.output, &config.target.handle, config_hash)?;

    let mut collector = Collector::new(source, sink, PacingPolicy::from_config(&config.pacing))
        .with_page_size(config.source.page_size);

    collector
        .run(&config.target.handle, config.target.minimum_items)
        .await
}
