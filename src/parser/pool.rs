//! Bounded worker pool for page extraction
//!
//! Work units run on tokio's blocking threads. A semaphore caps how many run
//! at once. The pool keeps no per-worker state: every unit gets its own
//! blocking thread and opens its own document handle, so a unit that panics
//! surfaces as a caught `JoinError` and one that overruns its time bound is
//! simply abandoned. The pool only counts what happened to each unit.
//!
//! ```text
//! execute(job)
//!   ├─ acquire permit   (bounded wait → Acquire / Closed)
//!   ├─ spawn_blocking   (permit moves into the thread)
//!   └─ await result     (bounded wait → Timeout)
//! ```
//!
//! The permit travels with the blocking closure, so a unit abandoned after a
//! timeout keeps its share of capacity until its thread actually finishes.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::document::{DocumentError, DocumentResult};

/// Default number of concurrent work units
pub const DEFAULT_CAPACITY: usize = 2;
/// Default wait for a free worker
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default execution bound for one work unit
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Pool sizing and time bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub capacity: usize,
    pub acquire_timeout: Duration,
    pub unit_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
        }
    }
}

/// Failure of a single work unit
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("No worker available after {waited_ms} ms")]
    Acquire { waited_ms: u64 },

    #[error("Worker pool is closed")]
    Closed,

    #[error("Work unit exceeded {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    #[error("Work unit failed: {0}")]
    Failed(#[from] DocumentError),

    #[error("Work unit panicked: {0}")]
    Panicked(String),
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Fixed-capacity pool of blocking workers
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    acquire_timeout: Duration,
    unit_timeout: Duration,
    active: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    panicked: AtomicUsize,
    timed_out: AtomicUsize,
}

impl WorkerPool {
    /// Create a pool; a capacity of zero is raised to one
    pub fn new(config: PoolConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            acquire_timeout: config.acquire_timeout,
            unit_timeout: config.unit_timeout,
            active: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            panicked: AtomicUsize::new(0),
            timed_out: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Execution bound applied to each work unit
    pub fn unit_timeout(&self) -> Duration {
        self.unit_timeout
    }

    /// Run `job` on a pooled worker
    pub async fn execute<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> DocumentResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = match timeout(self.acquire_timeout, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(PoolError::Closed),
            Err(_) => {
                let waited_ms = millis(self.acquire_timeout);
                warn!(waited_ms, "Timed out waiting for a worker");
                return Err(PoolError::Acquire { waited_ms });
            }
        };

        let _active = ActiveUnit::enter(&self.active);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match timeout(self.unit_timeout, handle).await {
            Ok(Ok(Ok(value))) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            Ok(Ok(Err(e))) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                debug!(error = %e, "Work unit returned an error");
                Err(PoolError::Failed(e))
            }
            Ok(Err(join_err)) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.panicked.fetch_add(1, Ordering::Relaxed);
                let message = if join_err.is_panic() {
                    panic_message(join_err.into_panic())
                } else {
                    "worker task was cancelled".to_string()
                };
                warn!(%message, "Worker panicked");
                Err(PoolError::Panicked(message))
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.timed_out.fetch_add(1, Ordering::Relaxed);
                let limit_ms = millis(self.unit_timeout);
                warn!(limit_ms, "Work unit timed out; abandoning its thread");
                Err(PoolError::Timeout { limit_ms })
            }
        }
    }

    /// Reject all further work
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            available: self.permits.available_permits(),
            active: self.active.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Counts a unit as active until dropped
struct ActiveUnit<'a>(&'a AtomicUsize);

impl<'a> ActiveUnit<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ActiveUnit<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Pool statistics
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub capacity: usize,
    /// Permits not held by a running or abandoned unit
    pub available: usize,
    /// Units the pool is currently waiting on
    pub active: usize,
    pub completed: usize,
    /// Units that errored, panicked or timed out
    pub failed: usize,
    pub panicked: usize,
    /// Units abandoned at the execution bound
    pub timed_out: usize,
}
