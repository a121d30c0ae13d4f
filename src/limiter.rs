//! Concurrency limiting for in-flight fetch attempts
//!
//! The limiter bounds how many fetch attempts may execute their network call
//! at the same instant. It wraps a [`tokio::sync::Semaphore`], which queues
//! waiters FIFO and suspends them without busy-waiting.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of simultaneously in-flight fetch attempts
///
/// A permit is held for the politeness delay plus one request/classification
/// cycle and released before any backoff sleep, so an identifier that is
/// backing off never occupies a slot another fetch could use.
#[derive(Clone)]
pub struct FetchLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl FetchLimiter {
    /// Create a limiter with the given capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_dl::limiter::FetchLimiter;
    ///
    /// let limiter = FetchLimiter::new(100);
    /// assert_eq!(limiter.available_permits(), 100);
    /// ```
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Acquire one slot, waiting until one frees if all are taken
    ///
    /// The slot is released when the returned permit is dropped. Returns
    /// `None` only if the semaphore has been closed, which the limiter never
    /// does itself — callers treat it as an unexpected infrastructure
    /// condition.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => None,
        }
    }

    /// Number of slots currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
