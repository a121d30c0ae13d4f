//! Per-identifier fetch-retry engine
//!
//! One [`FetchContext::fetch`] call drives a single identifier through the
//! attempt loop: acquire a limiter slot, sleep a random politeness delay,
//! issue the request, classify the result. Classification is an explicit
//! [`Attempt`] value — either a terminal outcome or a retry with its wait —
//! consumed by the driver loop, keeping the decision logic apart from the
//! control flow.
//!
//! Retryable conditions are HTTP 429 and request timeouts, each backing off
//! linearly with the attempt number. Everything else is terminal on the first
//! occurrence. Per-identifier failures are returned as data
//! ([`FetchOutcome::Failure`]); nothing in this module raises `Err`.

use crate::config::Config;
use crate::error::Result;
use crate::html::strip_html;
use crate::limiter::FetchLimiter;
use crate::types::{Event, FailureReason, FetchOutcome, ProductId, ProductRecord};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters shared by one run's fetch workers
///
/// Observability only — nothing reads these for flow control, so relaxed
/// ordering is sufficient.
#[derive(Debug, Default)]
pub struct RunStats {
    /// HTTP 429 responses observed across all attempts
    pub rate_limit_hits: AtomicU64,
}

/// Per-run state shared by every fetch worker
///
/// An explicit context object passed into each fetch invocation — the run's
/// HTTP client, configuration, limiter, counters, and event channel — so
/// workers share no ambient state.
#[derive(Clone)]
pub struct FetchContext {
    pub(crate) client: reqwest::Client,
    pub(crate) config: Arc<Config>,
    pub(crate) limiter: FetchLimiter,
    pub(crate) stats: Arc<RunStats>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

/// What the classifier decided about one attempt
enum Attempt {
    /// Transient condition — wait, then try again; `exhausted` is the reason
    /// reported if this was the last attempt in the budget
    Retry {
        wait: Duration,
        exhausted: FailureReason,
    },
    /// Finished, success or permanent failure
    Terminal(FetchOutcome),
}

/// Raw JSON shape of the catalog API's product-detail response
///
/// Only the consumed fields are modeled; unknown fields are ignored and any
/// of these may be null or absent.
#[derive(Debug, Deserialize)]
struct ApiProduct {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url_key: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

impl ApiProduct {
    fn into_record(self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name,
            url_key: self.url_key,
            price: self.price,
            description: strip_html(self.description.as_deref().unwrap_or_default()),
            image_url: self.thumbnail_url,
        }
    }
}

/// Build the HTTP client used for every fetch in a run
///
/// Fixed headers (User-Agent, Accept) and the per-request timeout live on
/// the client so every attempt behaves identically.
pub(crate) fn build_client(config: &Config) -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json, text/plain, */*"),
    );

    Ok(reqwest::Client::builder()
        .user_agent(config.fetch.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.fetch.request_timeout)
        .build()?)
}

impl FetchContext {
    /// Fetch one identifier to a terminal outcome
    ///
    /// Runs up to `max_retries` attempts. A limiter slot is held for the
    /// politeness delay and the request/classification of one attempt, and
    /// released before any backoff sleep.
    pub async fn fetch(&self, id: &ProductId) -> FetchOutcome {
        let max_retries = self.config.retry.max_retries;
        let url = format!(
            "{}/{}",
            self.config.fetch.base_url.trim_end_matches('/'),
            id
        );

        for attempt in 1..=max_retries {
            match self.run_attempt(id, &url, attempt).await {
                Attempt::Terminal(outcome) => {
                    self.emit_terminal(id, &outcome);
                    return outcome;
                }
                Attempt::Retry { wait, exhausted } => {
                    if attempt == max_retries {
                        tracing::error!(
                            id = %id,
                            attempts = max_retries,
                            reason = %exhausted,
                            "Giving up after exhausting retries"
                        );
                        let outcome = FetchOutcome::Failure {
                            id: id.clone(),
                            reason: exhausted,
                        };
                        self.emit_terminal(id, &outcome);
                        return outcome;
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }

        // Loop exit without a terminal classification (only possible with a
        // zero attempt budget)
        let outcome = FetchOutcome::Failure {
            id: id.clone(),
            reason: FailureReason::RetriesExhausted,
        };
        self.emit_terminal(id, &outcome);
        outcome
    }

    /// One attempt: limiter slot, politeness delay, request, classification
    async fn run_attempt(&self, id: &ProductId, url: &str, attempt: u32) -> Attempt {
        let Some(_permit) = self.limiter.acquire().await else {
            // Limiter closed out from under us — classified like any other
            // unexpected condition during an attempt
            tracing::error!(id = %id, "Concurrency limiter closed during fetch");
            return Attempt::Terminal(FetchOutcome::Failure {
                id: id.clone(),
                reason: FailureReason::Exception,
            });
        };

        self.politeness_delay().await;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                let wait = self.config.retry.timeout_backoff * attempt;
                tracing::warn!(
                    id = %id,
                    attempt,
                    max_attempts = self.config.retry.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    "Request timed out"
                );
                return Attempt::Retry {
                    wait,
                    exhausted: FailureReason::TimeoutExhausted,
                };
            }
            Err(err) => {
                tracing::error!(id = %id, error = %err, "Request failed");
                return Attempt::Terminal(FetchOutcome::Failure {
                    id: id.clone(),
                    reason: FailureReason::Exception,
                });
            }
        };

        self.classify_response(id, attempt, response).await
    }

    /// Classify an HTTP response into a retry or terminal decision
    async fn classify_response(
        &self,
        id: &ProductId,
        attempt: u32,
        response: reqwest::Response,
    ) -> Attempt {
        match response.status().as_u16() {
            429 => {
                self.stats.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
                let wait = self.config.retry.rate_limit_backoff * attempt;
                tracing::warn!(
                    id = %id,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limited by server"
                );
                self.event_tx
                    .send(Event::RateLimited {
                        id: id.clone(),
                        attempt,
                    })
                    .ok();
                Attempt::Retry {
                    wait,
                    exhausted: FailureReason::RateLimitExhausted,
                }
            }
            404 => {
                tracing::warn!(id = %id, "Product not found");
                Attempt::Terminal(FetchOutcome::Failure {
                    id: id.clone(),
                    reason: FailureReason::NotFound,
                })
            }
            200 => match response.json::<ApiProduct>().await {
                Ok(raw) => {
                    tracing::info!(id = %id, "Fetched product");
                    Attempt::Terminal(FetchOutcome::Success(raw.into_record()))
                }
                Err(err) if err.is_timeout() => {
                    let wait = self.config.retry.timeout_backoff * attempt;
                    tracing::warn!(
                        id = %id,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Response body timed out"
                    );
                    Attempt::Retry {
                        wait,
                        exhausted: FailureReason::TimeoutExhausted,
                    }
                }
                Err(err) => {
                    tracing::error!(id = %id, error = %err, "Failed to parse product body");
                    Attempt::Terminal(FetchOutcome::Failure {
                        id: id.clone(),
                        reason: FailureReason::Exception,
                    })
                }
            },
            status => {
                tracing::warn!(id = %id, status, "Unexpected HTTP status");
                Attempt::Terminal(FetchOutcome::Failure {
                    id: id.clone(),
                    reason: FailureReason::HttpStatus(status),
                })
            }
        }
    }

    /// Sleep a uniformly random delay within the configured politeness range
    ///
    /// Applied before every attempt, retries included.
    async fn politeness_delay(&self) {
        let min = self.config.fetch.politeness_delay_min;
        let max = self.config.fetch.politeness_delay_max;

        let wait = if max > min {
            let span_ms = (max - min).as_millis() as u64;
            min + Duration::from_millis(rand::thread_rng().gen_range(0..=span_ms))
        } else {
            min
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    fn emit_terminal(&self, id: &ProductId, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(_) => {
                self.event_tx.send(Event::Fetched { id: id.clone() }).ok();
            }
            FetchOutcome::Failure { reason, .. } => {
                self.event_tx
                    .send(Event::FetchFailed {
                        id: id.clone(),
                        reason: *reason,
                    })
                    .ok();
            }
        }
    }
}
