//! # catalog-dl
//!
//! Checkpointed bulk crawling library for remote product catalogs.
//!
//! ## Design Philosophy
//!
//! catalog-dl is designed to be:
//! - **Resumable** - progress is checkpointed per batch; an interrupted run
//!   picks up exactly where the last completed batch left off
//! - **Polite under pressure** - bounded concurrency, randomized politeness
//!   delays, and linear backoff on server throttling
//! - **Failure-preserving** - permanently failed identifiers are recorded,
//!   never lost and never allowed to abort the run
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use catalog_dl::{CatalogDownloader, Config, ProductId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         fetch: catalog_dl::FetchConfig {
//!             base_url: "https://api.example.com/v1/products".to_string(),
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let downloader = CatalogDownloader::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let ids: Vec<ProductId> = vec!["1001".into(), "1002".into()];
//!     let summary = downloader.run(&ids).await?;
//!     println!("done: {} successes", summary.successes);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch artifacts and checkpoint resolution
pub mod checkpoint;
/// Configuration types
pub mod config;
/// Batch orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Durable failure log
pub mod failures;
/// Per-identifier fetch-retry engine
pub mod fetcher;
/// HTML description normalization
pub mod html;
/// Identifier-list loading
pub mod input;
/// Concurrency limiting for in-flight fetches
pub mod limiter;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{BatchConfig, Config, FetchConfig, RetryConfig};
pub use downloader::CatalogDownloader;
pub use error::{Error, Result};
pub use failures::FailureSink;
pub use html::strip_html;
pub use input::load_identifiers;
pub use limiter::FetchLimiter;
pub use types::{
    Event, FailureReason, FailureRecord, FetchOutcome, ProductId, ProductRecord, RunSummary,
};
