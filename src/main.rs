//! Timeline Harvester main entry point
//!
//! This is the command-line interface for the timeline harvester.

use clap::Parser;
use std::path::PathBuf;
use timeline_harvester::collector::{harvest, print_summary};
use timeline_harvester::config::{load_config_with_hash, validate_handle, Config};
use tracing_subscriber::EnvFilter;

/// Timeline Harvester: collects every item of one account
///
/// Walks the account's pages from newest to oldest, pacing requests with
/// random delays and waiting out rate limits, and appends each item to a
/// per-handle output file as soon as it arrives.
#[derive(Parser, Debug)]
#[command(name = "timeline-harvester")]
#[command(version)]
#[command(about = "Collects every item of one account", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Account handle to harvest (overrides the config file)
    #[arg(long)]
    handle: Option<String>,

    /// Minimum number of items to collect (overrides the config file)
    #[arg(long, allow_negative_numbers = true)]
    minimum: Option<i64>,

    /// Ignore the saved session and log in again
    #[arg(long)]
    relogin: bool,

    /// Validate config and show what would be harvested without any requests
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(handle) = cli.handle {
        validate_handle(&handle)?;
        config.target.handle = handle;
    }
    if let Some(minimum) = cli.minimum {
        config.target.minimum_items = minimum;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match harvest(&config, &config_hash, cli.relogin).await {
        Ok(summary) => {
            if !cli.quiet {
                print_summary(&config.target.handle, &summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("timeline_harvester=info,warn"),
            1 => EnvFilter::new("timeline_harvester=debug,info"),
            2 => EnvFilter::new("timeline_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Timeline Harvester Dry Run ===\n");

    println!("Target:");
    println!("  Handle: @{}", config.target.handle);
    println!("  Minimum items: {}", config.target.minimum_items);

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Page size: {}", config.source.page_size);
    println!("  User agent: {}", config.source.user_agent);

    println!("\nPacing:");
    println!(
        "  Inter-page delay: {}-{}s",
        config.pacing.min_delay_secs, config.pacing.max_delay_secs
    );
    match config.pacing.max_total_backoff_secs {
        Some(limit) => println!("  Max total backoff: {}s", limit),
        None => println!("  Max total backoff: unbounded"),
    }

    println!("\nSession:");
    println!("  File: {}", config.session.path.display());
    println!(
        "  Credentials: {}",
        if config.session.credentials.is_some() {
            "configured"
        } else {
            "none"
        }
    );

    println!("\nOutput:");
    println!(
        "  File: {}",
        config.output.path_for(&config.target.handle).display()
    );

    println!("\n✓ Configuration is valid");
}
