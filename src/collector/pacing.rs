//! Pacing policy for page requests
//!
//! Two delays keep the collector from escalating throttling:
//! - a uniformly random pause before every page after the first
//! - a wait until the server's rate-limit window resets

use crate::config::PacingConfig;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Decides how long to wait between requests
#[derive(Debug)]
pub struct PacingPolicy {
    min_delay: Duration,
    max_delay: Duration,
    max_total_backoff: Option<Duration>,
    rng: StdRng,
}

impl PacingPolicy {
    /// Creates a policy with an inclusive inter-page delay range
    ///
    /// If `min_delay` exceeds `max_delay` the bounds are swapped.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            min_delay,
            max_delay,
            max_total_backoff: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        let (min, max) = config.delay_range();
        Self::new(min, max).with_max_total_backoff(config.max_total_backoff())
    }

    /// A policy that never sleeps between pages
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Caps the cumulative time spent waiting out rate limits in one run
    pub fn with_max_total_backoff(mut self, limit: Option<Duration>) -> Self {
        self.max_total_backoff = limit;
        self
    }

    /// Uses a fixed seed so that the jitter sequence is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn max_total_backoff(&self) -> Option<Duration> {
        self.max_total_backoff
    }

    /// Random pause to apply before fetching any page but the first
    ///
    /// Uniform over `[min_delay, max_delay]` at millisecond resolution.
    pub fn inter_page_delay(&mut self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    /// Time to wait after a rate-limit signal that resets at `reset_at`
    pub fn rate_limit_delay(&self, reset_at: DateTime<Utc>) -> Duration {
        Self::rate_limit_delay_from(reset_at, Utc::now())
    }

    /// `max(0, reset_at - now)`
    ///
    /// A reset time in the past (clock skew between us and the server)
    /// yields zero rather than an error.
    pub fn rate_limit_delay_from(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        (reset_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_config(&PacingConfig::default())
    }
}
