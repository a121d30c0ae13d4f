//! Batch orchestration
//!
//! [`CatalogDownloader`] drives a crawl to completion: it resolves the resume
//! point from existing batch artifacts, executes one batch at a time with all
//! of the batch's fetches dispatched concurrently, and checkpoints each batch
//! by persisting its artifact before flushing failures and moving on.
//!
//! Batches are strictly sequential — batch `i + 1` never starts before batch
//! `i`'s artifact is on disk and its failures are flushed. Within a batch the
//! join point is hard: nothing is persisted until every dispatched fetch has
//! reached a terminal outcome.

use crate::checkpoint;
use crate::config::Config;
use crate::error::Result;
use crate::failures::FailureSink;
use crate::fetcher::{self, FetchContext, RunStats};
use crate::limiter::FetchLimiter;
use crate::types::{Event, FailureRecord, FetchOutcome, ProductId, RunSummary};
use futures::future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Within-batch progress is logged every this many completed fetches
const PROGRESS_LOG_INTERVAL: usize = 200;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Main crawler instance (cloneable — shared state is Arc-wrapped)
#[derive(Clone)]
pub struct CatalogDownloader {
    /// Configuration (wrapped in Arc for sharing across fetch workers)
    config: Arc<Config>,
    /// HTTP client shared by every fetch in every run
    client: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl CatalogDownloader {
    /// Create a downloader from a validated configuration
    ///
    /// Fails fast on configuration problems — before any network or disk
    /// activity.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = fetcher::build_client(&config)?;
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            client,
            event_tx,
        })
    }

    /// Subscribe to crawl events
    ///
    /// Events are best-effort; a receiver that falls behind misses events
    /// rather than slowing the crawl.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load identifiers from the upstream CSV and run the crawl
    pub async fn run_from_csv(&self, path: &Path) -> Result<RunSummary> {
        let identifiers = crate::input::load_identifiers(path)?;
        self.run(&identifiers).await
    }

    /// Crawl the given identifier list to completion
    ///
    /// Resumes from the highest checkpointed batch. Per-identifier failures
    /// are recorded in the failure log and never abort the run; an `Err` here
    /// means an infrastructure failure (artifact or failure-log I/O), after
    /// which the interrupted batch holds no artifact and is redone on the
    /// next call.
    pub async fn run(&self, identifiers: &[ProductId]) -> Result<RunSummary> {
        let run_start = Instant::now();
        let batch_size = self.config.batch.batch_size;
        let total_batches = identifiers.len().div_ceil(batch_size);
        let sink = FailureSink::new(&self.config.batch.failure_log);

        let start_batch = checkpoint::next_batch_index(&self.config.batch.output_dir)?;
        tracing::info!(
            start_batch,
            total_batches,
            identifiers = identifiers.len(),
            "Resuming from checkpoint"
        );

        let stats = Arc::new(RunStats::default());
        let ctx = FetchContext {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            limiter: FetchLimiter::new(self.config.fetch.max_concurrency),
            stats: Arc::clone(&stats),
            event_tx: self.event_tx.clone(),
        };

        let mut batches_run = 0usize;
        let mut run_successes = 0u64;
        let mut run_failures = 0u64;

        for index in start_batch..=total_batches {
            let start = (index - 1) * batch_size;
            let end = (start + batch_size).min(identifiers.len());
            let batch_ids = &identifiers[start..end];

            tracing::info!(
                batch = index,
                total_batches,
                size = batch_ids.len(),
                "Processing batch"
            );
            self.event_tx
                .send(Event::BatchStarted {
                    index,
                    total: total_batches,
                    size: batch_ids.len(),
                })
                .ok();

            // Hard join point: every fetch reaches a terminal outcome before
            // anything below runs
            let outcomes = run_batch(&ctx, index, batch_ids).await;

            let mut successes = Vec::new();
            let mut failures = Vec::new();
            for outcome in outcomes {
                match outcome {
                    FetchOutcome::Success(record) => successes.push(record),
                    FetchOutcome::Failure { id, reason } => {
                        failures.push(FailureRecord::new(id, reason));
                    }
                }
            }

            // The batch is checkpointed only once this write has completed
            let artifact =
                checkpoint::write_artifact(&self.config.batch.output_dir, index, &successes)?;
            let flushed = sink.flush(&failures)?;
            if flushed > 0 {
                tracing::warn!(
                    batch = index,
                    flushed,
                    log = %sink.path().display(),
                    "Appended failed identifiers"
                );
            }

            run_successes += successes.len() as u64;
            run_failures += failures.len() as u64;
            batches_run += 1;

            tracing::info!(
                batch = index,
                saved = successes.len(),
                failed = failures.len(),
                artifact = %artifact.display(),
                total_successes = run_successes,
                "Batch checkpointed"
            );
            self.event_tx
                .send(Event::BatchCompleted {
                    index,
                    successes: successes.len(),
                    failures: failures.len(),
                })
                .ok();

            if index < total_batches {
                tokio::time::sleep(self.config.batch.cooldown).await;
            }
        }

        let failures_on_disk = sink.count()?;
        let summary = RunSummary {
            batches_run,
            successes: run_successes,
            failures: run_failures,
            failures_on_disk,
            rate_limit_hits: stats.rate_limit_hits.load(Ordering::Relaxed),
            elapsed: run_start.elapsed(),
        };

        tracing::info!(
            batches = summary.batches_run,
            successes = summary.successes,
            failures = summary.failures,
            failures_on_disk = summary.failures_on_disk,
            rate_limit_hits = summary.rate_limit_hits,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "Crawl finished"
        );
        self.event_tx
            .send(Event::RunCompleted {
                successes: summary.successes,
                failures_on_disk: summary.failures_on_disk,
            })
            .ok();

        Ok(summary)
    }
}

/// Dispatch one batch's fetches concurrently and wait for all of them
///
/// Concurrency is bounded by the context's limiter; this join collects every
/// terminal outcome, in completion-independent order.
async fn run_batch(ctx: &FetchContext, index: usize, ids: &[ProductId]) -> Vec<FetchOutcome> {
    let total = ids.len();
    let completed = AtomicUsize::new(0);

    let fetches = ids.iter().map(|id| {
        let completed = &completed;
        async move {
            let outcome = ctx.fetch(id).await;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_LOG_INTERVAL == 0 {
                tracing::info!(batch = index, done, total, "Batch progress");
            }
            outcome
        }
    });

    future::join_all(fetches).await
}
