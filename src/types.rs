//! Core types for catalog-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier of one catalog item, as supplied by the input list
///
/// Identifiers are opaque tokens — the crawler never interprets them beyond
/// substituting them into the request path. Uniqueness within a run is the
/// responsibility of the upstream deduplication step.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Create a new ProductId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One successfully fetched product, as persisted in batch artifacts
///
/// Field values come straight from the catalog API response; `description`
/// has its markup stripped to plain text and `image_url` is sourced from the
/// response's `thumbnail_url`. The remote record's own fields may be null,
/// hence the `Option`s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Numeric id reported by the catalog API (may differ from the input token)
    pub id: Option<i64>,

    /// Product display name
    pub name: Option<String>,

    /// URL slug of the product page
    pub url_key: Option<String>,

    /// Listed price
    pub price: Option<f64>,

    /// Product description, markup stripped to newline-separated plain text
    pub description: String,

    /// Thumbnail image URL
    pub image_url: Option<String>,
}

/// Why an identifier permanently failed
///
/// Retryable conditions (429, timeout) only appear here in their exhausted
/// form — an identifier that recovered within the retry budget is a success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// HTTP 404 — the record does not exist
    NotFound,
    /// Any HTTP status outside {200, 404, 429} (treated as permanent)
    HttpStatus(u16),
    /// Request timed out on every attempt
    TimeoutExhausted,
    /// HTTP 429 on every attempt
    RateLimitExhausted,
    /// Request or body handling failed in an unexpected way
    Exception,
    /// Attempt budget ran out without a terminal classification
    RetriesExhausted,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NotFound => write!(f, "not_found"),
            FailureReason::HttpStatus(code) => write!(f, "http_{code}"),
            FailureReason::TimeoutExhausted => write!(f, "timeout_exhausted"),
            FailureReason::RateLimitExhausted => write!(f, "rate_limited_exhausted"),
            FailureReason::Exception => write!(f, "exception"),
            FailureReason::RetriesExhausted => write!(f, "retries_exhausted"),
        }
    }
}

/// Terminal result of fetching one identifier
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// The record was fetched and parsed
    Success(ProductRecord),
    /// The identifier permanently failed
    Failure {
        /// The input identifier that failed
        id: ProductId,
        /// Why it failed
        reason: FailureReason,
    },
}

impl FetchOutcome {
    /// Returns true for the `Success` variant
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// One durable row of the failure log (`id,error` columns)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The input identifier that failed
    pub id: ProductId,
    /// Failure reason in its stable string form (see [`FailureReason`])
    pub error: String,
}

impl FailureRecord {
    /// Build a record from an identifier and its failure reason
    pub fn new(id: ProductId, reason: FailureReason) -> Self {
        Self {
            id,
            error: reason.to_string(),
        }
    }
}

/// Events emitted during a crawl
///
/// Consumers subscribe via [`CatalogDownloader::subscribe`](crate::CatalogDownloader::subscribe).
/// Events are best-effort: a slow subscriber may miss events (broadcast
/// channel semantics), and the crawl never blocks on delivery.
#[derive(Clone, Debug)]
pub enum Event {
    /// A batch began executing
    BatchStarted {
        /// 1-based batch index
        index: usize,
        /// Total number of batches in the input list
        total: usize,
        /// Number of identifiers in this batch
        size: usize,
    },
    /// A batch's artifact was persisted and its failures flushed
    BatchCompleted {
        /// 1-based batch index
        index: usize,
        /// Successful records in the batch artifact
        successes: usize,
        /// Failure rows flushed for this batch
        failures: usize,
    },
    /// One identifier was fetched successfully
    Fetched {
        /// The fetched identifier
        id: ProductId,
    },
    /// One identifier reached a permanent failure
    FetchFailed {
        /// The failed identifier
        id: ProductId,
        /// Why it failed
        reason: FailureReason,
    },
    /// The server answered 429 for an attempt
    RateLimited {
        /// The throttled identifier
        id: ProductId,
        /// Attempt number that was throttled (1-based)
        attempt: u32,
    },
    /// The crawl finished
    RunCompleted {
        /// Successful records persisted across this run
        successes: u64,
        /// Total failure rows on disk, including previous runs
        failures_on_disk: u64,
    },
}

/// End-of-run accounting returned by [`CatalogDownloader::run`](crate::CatalogDownloader::run)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches executed by this run (batches skipped on resume are not counted)
    pub batches_run: usize,
    /// Successful records persisted by this run
    pub successes: u64,
    /// Permanent failures recorded by this run
    pub failures: u64,
    /// Total failure rows on disk after the run, including previous runs
    pub failures_on_disk: u64,
    /// HTTP 429 responses observed across all attempts
    pub rate_limit_hits: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}
