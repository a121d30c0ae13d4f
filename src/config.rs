//! Configuration types for catalog-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Remote API and request behavior configuration
///
/// Groups settings related to how individual product fetches are issued.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Catalog API base URL; the identifier is appended as the final path
    /// segment (`GET {base_url}/{id}`). Required — there is no usable default.
    #[serde(default)]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum simultaneously in-flight fetch attempts (default: 100)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout; exceeding it counts as a retryable timeout
    /// (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Lower bound of the random politeness delay before each attempt
    /// (default: 500 ms)
    #[serde(default = "default_politeness_min", with = "duration_ms_serde")]
    pub politeness_delay_min: Duration,

    /// Upper bound of the random politeness delay before each attempt
    /// (default: 1000 ms)
    #[serde(default = "default_politeness_max", with = "duration_ms_serde")]
    pub politeness_delay_max: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: default_user_agent(),
            max_concurrency: default_max_concurrency(),
            request_timeout: default_request_timeout(),
            politeness_delay_min: default_politeness_min(),
            politeness_delay_max: default_politeness_max(),
        }
    }
}

/// Retry configuration for transient failures
///
/// Two conditions are retryable, each with its own linear backoff base:
/// HTTP 429 and request timeouts. The wait before attempt `a + 1` is
/// `base * a` — the backoff grows with the attempt number.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per identifier (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base after an HTTP 429, scaled by attempt number
    /// (default: 5 seconds)
    #[serde(default = "default_rate_limit_backoff", with = "duration_serde")]
    pub rate_limit_backoff: Duration,

    /// Backoff base after a request timeout, scaled by attempt number
    /// (default: 2 seconds)
    #[serde(default = "default_timeout_backoff", with = "duration_serde")]
    pub timeout_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            rate_limit_backoff: default_rate_limit_backoff(),
            timeout_backoff: default_timeout_backoff(),
        }
    }
}

/// Batch sizing, output locations, and pacing
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Identifiers per batch — the checkpoint granularity (default: 1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory receiving one `batch_{index}.json` artifact per completed
    /// batch (default: "batches"); created if missing
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Append-only failure log with `id,error` columns
    /// (default: "failed_ids.csv")
    #[serde(default = "default_failure_log")]
    pub failure_log: PathBuf,

    /// Cool-down slept between consecutive batches (default: 3 seconds)
    #[serde(default = "default_cooldown", with = "duration_serde")]
    pub cooldown: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            output_dir: default_output_dir(),
            failure_log: default_failure_log(),
            cooldown: default_cooldown(),
        }
    }
}

/// Main configuration for [`CatalogDownloader`](crate::CatalogDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`fetch`](FetchConfig) — remote API, concurrency, politeness delays
/// - [`retry`](RetryConfig) — attempt budget and backoff bases
/// - [`batch`](BatchConfig) — batch size, output paths, pacing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API and request behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry budget and backoff bases
    #[serde(default)]
    pub retry: RetryConfig,

    /// Batch sizing, output locations, and pacing
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Validate the configuration, returning the first violation found
    ///
    /// Checked at downloader construction so a bad config fails before any
    /// network or disk activity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.base_url.is_empty() {
            return Err(Error::Config {
                message: "base_url must not be empty".to_string(),
                key: Some("fetch.base_url".to_string()),
            });
        }
        if url::Url::parse(&self.fetch.base_url).is_err() {
            return Err(Error::Config {
                message: format!("base_url is not a valid URL: {}", self.fetch.base_url),
                key: Some("fetch.base_url".to_string()),
            });
        }
        if self.fetch.max_concurrency == 0 {
            return Err(Error::Config {
                message: "max_concurrency must be at least 1".to_string(),
                key: Some("fetch.max_concurrency".to_string()),
            });
        }
        if self.fetch.politeness_delay_min > self.fetch.politeness_delay_max {
            return Err(Error::Config {
                message: "politeness_delay_min must not exceed politeness_delay_max".to_string(),
                key: Some("fetch.politeness_delay_min".to_string()),
            });
        }
        if self.retry.max_retries == 0 {
            return Err(Error::Config {
                message: "max_retries must be at least 1".to_string(),
                key: Some("retry.max_retries".to_string()),
            });
        }
        if self.batch.batch_size == 0 {
            return Err(Error::Config {
                message: "batch_size must be at least 1".to_string(),
                key: Some("batch.batch_size".to_string()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
        "AppleWebKit/537.36 (KHTML, like Gecko) ",
        "Chrome/124.0.0.0 Safari/537.36"
    )
    .to_string()
}

fn default_max_concurrency() -> usize {
    100
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_politeness_min() -> Duration {
    Duration::from_millis(500)
}

fn default_politeness_max() -> Duration {
    Duration::from_millis(1000)
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout_backoff() -> Duration {
    Duration::from_secs(2)
}

fn default_batch_size() -> usize {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("batches")
}

fn default_failure_log() -> PathBuf {
    PathBuf::from("failed_ids.csv")
}

fn default_cooldown() -> Duration {
    Duration::from_secs(3)
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

// Duration serialization helper (milliseconds, for sub-second delays)
mod duration_ms_serde {
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
