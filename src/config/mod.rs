//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use timeline_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Collecting items for @{}", config.target.handle);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, Credentials, OutputConfig, OutputFormat, PacingConfig, SessionConfig, SourceConfig,
    TargetConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_handle};
