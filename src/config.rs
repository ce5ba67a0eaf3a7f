//! Configuration types for regs-harvest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default base URL of the regulations.gov v4 API
pub const DEFAULT_BASE_URL: &str = "https://api.regulations.gov/v4";

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 250;

/// Main configuration for a [`Harvester`](crate::Harvester)
///
/// Every field has a default, so an empty JSON object is a valid config file
/// as long as credentials are supplied some other way (CLI flags, env).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API access and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry, backoff and key rotation policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// List endpoint traversal
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Harvest run defaults (caps, attachments, output location)
    #[serde(default)]
    pub harvest: HarvestConfig,
}

impl Config {
    /// Load a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("cannot read config file {}: {}", path.display(), e),
                "config",
            )
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Check settings that would make a run impossible or misbehave
    ///
    /// Credentials are checked after [`ApiConfig::load_keys`] has merged the
    /// keys file, so call this on the final, merged config.
    pub fn validate(&self) -> Result<()> {
        if self.api.api_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::config(
                "at least one API key is required",
                "api.api_keys",
            ));
        }
        if self.pagination.page_size == 0 || self.pagination.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(
                format!(
                    "page_size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, self.pagination.page_size
                ),
                "pagination.page_size",
            ));
        }
        if self.retry.max_retries_per_key == 0 {
            return Err(Error::config(
                "max_retries_per_key must be at least 1",
                "retry.max_retries_per_key",
            ));
        }
        Ok(())
    }
}

/// Upstream API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL without trailing slash (default: "https://api.regulations.gov/v4")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API keys, rotated in this order
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// File with one API key per line; replaces `api_keys` when set
    #[serde(default)]
    pub keys_file: Option<PathBuf>,

    /// Start rotation at a random key instead of the first (default: false)
    #[serde(default)]
    pub random_start: bool,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_keys: Vec::new(),
            keys_file: None,
            random_start: false,
            request_timeout: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Merge the keys file (if any) into `api_keys`
    ///
    /// Non-blank lines are trimmed and replace the inline list. A keys file
    /// that is missing or contains no keys is a configuration error.
    pub fn load_keys(&mut self) -> Result<()> {
        let Some(path) = &self.keys_file else {
            return Ok(());
        };

        let keys = read_keys_file(path)?;
        tracing::info!(count = keys.len(), path = %path.display(), "loaded API keys from file");
        self.api_keys = keys;
        Ok(())
    }
}

/// Read an API keys file: one key per line, blank lines ignored
pub fn read_keys_file(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::config(
            format!("API keys file {} not readable: {}", path.display(), e),
            "api.keys_file",
        )
    })?;

    let keys: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(Error::config(
            format!("no API keys found in {}", path.display()),
            "api.keys_file",
        ));
    }
    Ok(keys)
}

/// Retry and rotation policy for a single logical request
///
/// Every attempt, including ones rejected with HTTP 429, counts against the
/// same budget of `max_retries_per_key × key_count` attempts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts granted per configured key (default: 3)
    #[serde(default = "default_max_retries_per_key")]
    pub max_retries_per_key: u32,

    /// Wait after rotating away from a rate-limited key (default: 2 seconds)
    #[serde(default = "default_rate_limit_cooldown", with = "duration_serde")]
    pub rate_limit_cooldown: Duration,

    /// Wait after any other failure (default: 2 seconds)
    #[serde(default = "default_error_cooldown", with = "duration_serde")]
    pub error_cooldown: Duration,

    /// Extended wait once every key has failed within one request (default: 30 seconds)
    #[serde(default = "default_cycle_cooldown", with = "optional_duration_serde")]
    pub cycle_cooldown: Option<Duration>,

    /// Rotate to the next key after a non-429 failure (default: true)
    #[serde(default = "default_true")]
    pub rotate_on_error: bool,

    /// Add random jitter to waits (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries_per_key: default_max_retries_per_key(),
            rate_limit_cooldown: default_rate_limit_cooldown(),
            error_cooldown: default_error_cooldown(),
            cycle_cooldown: default_cycle_cooldown(),
            rotate_on_error: true,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Policy with every wait set to zero, for tests and local mocks
    pub fn immediate() -> Self {
        Self {
            rate_limit_cooldown: Duration::ZERO,
            error_cooldown: Duration::ZERO,
            cycle_cooldown: None,
            ..Self::default()
        }
    }
}

/// Page traversal settings for list endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items requested per page (default: 250, the API maximum)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between successful page fetches (default: 100 milliseconds)
    #[serde(default = "default_page_delay", with = "duration_millis_serde")]
    pub page_delay: Duration,

    /// Log progress every N pages on large listings (default: 5)
    #[serde(default = "default_progress_every")]
    pub progress_every: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_delay: default_page_delay(),
            progress_every: default_progress_every(),
        }
    }
}

/// Harvest run defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Stop after this many comments across all documents (None = unlimited)
    #[serde(default)]
    pub max_comments: Option<usize>,

    /// Download attachments and extract their text (default: true)
    #[serde(default = "default_true")]
    pub extract_attachments: bool,

    /// Directory the CSV file is written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Parent for per-comment download directories (None = system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_comments: None,
            extract_attachments: true,
            output_dir: default_output_dir(),
            temp_dir: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_max_retries_per_key() -> u32 {
    3
}

fn default_rate_limit_cooldown() -> Duration {
    Duration::from_secs(2)
}

fn default_error_cooldown() -> Duration {
    Duration::from_secs(2)
}

fn default_cycle_cooldown() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_page_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_progress_every() -> u32 {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper (whole seconds, null = disabled)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// Sub-second delays
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
