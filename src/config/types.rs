use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The account to collect and how many items to aim for
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Account handle, without a leading '@'
    pub handle: String,

    /// Collection stops once this many items have been recorded
    #[serde(rename = "minimum-items", default = "default_minimum_items")]
    pub minimum_items: i64,
}

/// Remote API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the remote API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of items requested for the first page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Delays applied between requests
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the randomized inter-page delay (seconds)
    #[serde(rename = "min-delay-secs", default = "default_min_delay_secs")]
    pub min_delay_secs: u64,

    /// Upper bound of the randomized inter-page delay (seconds, inclusive)
    #[serde(rename = "max-delay-secs", default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Cap on cumulative rate-limit waiting; unbounded when absent
    #[serde(rename = "max-total-backoff-secs", default)]
    pub max_total_backoff_secs: Option<u64>,
}

/// Persisted session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the saved session cookie file
    #[serde(default = "default_session_path")]
    pub path: PathBuf,

    /// Login credentials, only needed when no session file exists
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the per-handle output file is written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Storage format of the output file
    #[serde(default)]
    pub format: OutputFormat,
}

/// Supported output stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Sqlite,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "db",
        }
    }
}

impl OutputConfig {
    /// Path of the output file for the given handle
    pub fn path_for(&self, handle: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", handle, self.format.extension()))
    }
}

impl SourceConfig {
    /// Parses the base URL so that relative joins land underneath it
    ///
    /// A missing trailing slash is added: `https://host/v2` becomes
    /// `https://host/v2/`, and joining `items` gives `https://host/v2/items`.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl PacingConfig {
    pub fn delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.min_delay_secs),
            Duration::from_secs(self.max_delay_secs),
        )
    }

    pub fn max_total_backoff(&self) -> Option<Duration> {
        self.max_total_backoff_secs.map(Duration::from_secs)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            max_total_backoff_secs: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
        }
    }
}

fn default_minimum_items() -> i64 {
    5000
}

fn default_page_size() -> u32 {
    20
}

fn default_user_agent() -> String {
    format!("timeline-harvester/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_delay_secs() -> u64 {
    5
}

fn default_max_delay_secs() -> u64 {
    10
}

fn default_session_path() -> PathBuf {
    PathBuf::from("cookies.json")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}
