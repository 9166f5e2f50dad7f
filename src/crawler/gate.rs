//! Admission gate bounding in-flight network requests
//!
//! One gate is created per crawl and cloned into every component that talks
//! to the network. Brand, collection and product fetches all draw from the
//! same permits, so fanning out deeper never raises real concurrency above
//! the configured ceiling.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Counting semaphore shared by all fetches of a crawl
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` holders at once
    ///
    /// A capacity of zero is raised to one so the gate can never deadlock.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot
    ///
    /// The slot is released when the returned permit is dropped, whether the
    /// request succeeded or not.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    /// Maximum number of concurrent holders
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}
