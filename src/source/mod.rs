//! Remote source module
//!
//! This module contains the boundary to the paginated remote API:
//! - The `RemoteSource` trait the collector drives
//! - Rate-limit signalling and error classification
//! - The reqwest-backed `HttpSource`

mod http;
mod traits;

pub use http::{HttpSource, RATE_LIMIT_RESET_HEADER};
pub use traits::{RateLimitSignal, RemoteSource, SourceError, SourceResult};
