//! Test configuration helpers — fast crawl configs against temp directories

use catalog_dl::{BatchConfig, Config, FetchConfig, RetryConfig};
use std::path::Path;
use std::time::Duration;

/// Build a crawl config pointed at a mock server and a temp directory.
///
/// Politeness delays and the batch cooldown are zeroed and the backoff bases
/// shrunk so tests run in milliseconds; the classification and checkpoint
/// behavior under test is unchanged.
pub fn crawl_config(server_uri: &str, dir: &Path) -> Config {
    Config {
        fetch: FetchConfig {
            base_url: format!("{server_uri}/products"),
            max_concurrency: 8,
            request_timeout: Duration::from_secs(5),
            politeness_delay_min: Duration::ZERO,
            politeness_delay_max: Duration::ZERO,
            ..FetchConfig::default()
        },
        retry: RetryConfig {
            max_retries: 3,
            rate_limit_backoff: Duration::from_millis(100),
            timeout_backoff: Duration::from_millis(50),
        },
        batch: BatchConfig {
            batch_size: 1000,
            output_dir: dir.join("batches"),
            failure_log: dir.join("failed_ids.csv"),
            cooldown: Duration::ZERO,
        },
    }
}
