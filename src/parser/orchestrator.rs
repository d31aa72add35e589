//! Parse orchestration
//!
//! Splits a document's pages into contiguous ranges, runs one work unit per
//! range on the worker pool and stitches the partial element lists back
//! together in page order. Any unit failure fails the whole request.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, info};

use super::config::ParseConfig;
use super::element::{Element, ParseResult};
use super::error::ParseError;
use super::extract::extract_pages;
use super::partition::partition_pages;
use super::pool::{PoolError, WorkerPool};
use crate::document::DocumentBackend;

/// Coordinates work units for each request
#[derive(Clone)]
pub struct ParseOrchestrator {
    backend: Arc<dyn DocumentBackend>,
    pool: Arc<WorkerPool>,
}

impl ParseOrchestrator {
    pub fn new(backend: Arc<dyn DocumentBackend>, pool: Arc<WorkerPool>) -> Self {
        Self { backend, pool }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Parse a whole document
    pub async fn parse(
        &self,
        data: Arc<Vec<u8>>,
        config: &ParseConfig,
    ) -> Result<ParseResult, ParseError> {
        config.validate()?;

        let num_pages = self.page_count(data.clone()).await?;
        if num_pages == 0 {
            info!("Document has no pages");
            return Ok(ParseResult::empty());
        }

        // Units past the pool's capacity would only queue behind this request's
        // own units and could time out waiting for them
        let units = config.max_processors.min(self.pool.capacity());
        let ranges = partition_pages(num_pages, units);
        info!(
            num_pages,
            requested = config.max_processors,
            units = ranges.len(),
            backend = self.backend.name(),
            "Dispatching work units"
        );

        let cancel = CancelOnDrop::new();
        let units = ranges
            .into_iter()
            .map(|pages| self.run_unit(pages, data.clone(), config.clone(), cancel.flag()));

        // try_join_all keeps input order and drops the remaining units on the first error;
        // the guard then tells their threads to stop
        let partials = try_join_all(units).await?;
        cancel.disarm();

        let elements: Vec<Element> = partials.into_iter().flatten().collect();
        info!(num_pages, elements = elements.len(), "Parse complete");
        Ok(ParseResult {
            elements,
            num_pages,
        })
    }

    /// Open the document once to learn its page count
    ///
    /// Runs on the pool like any work unit, so document decoding never
    /// exceeds the pool's capacity.
    async fn page_count(&self, data: Arc<Vec<u8>>) -> Result<usize, ParseError> {
        let backend = self.backend.clone();
        let result = self
            .pool
            .execute(move || backend.open(&data).map(|source| source.page_count()))
            .await;

        result.map_err(|e| match e {
            PoolError::Acquire { waited_ms } => ParseError::Resource { waited_ms },
            PoolError::Closed => ParseError::ShuttingDown,
            PoolError::Failed(e) => {
                debug!(error = %e, "Rejected document");
                ParseError::Document(e.to_string())
            }
            PoolError::Panicked(msg) => {
                ParseError::Document(format!("Document could not be read: {msg}"))
            }
            PoolError::Timeout { limit_ms } => ParseError::Document(format!(
                "Document could not be opened within {limit_ms} ms"
            )),
        })
    }

    async fn run_unit(
        &self,
        pages: Range<usize>,
        data: Arc<Vec<u8>>,
        config: ParseConfig,
        cancel: Arc<AtomicBool>,
    ) -> Result<Vec<Element>, ParseError> {
        let (start_page, end_page) = (pages.start + 1, pages.end);
        debug!(start_page, end_page, "Work unit dispatched");

        let backend = self.backend.clone();
        let result = self
            .pool
            .execute(move || {
                let source = backend.open(&data)?;
                extract_pages(source.as_ref(), pages, &config, &cancel)
            })
            .await;

        match result {
            Ok(elements) => {
                debug!(start_page, end_page, elements = elements.len(), "Work unit finished");
                Ok(elements)
            }
            Err(e) => {
                let err = unit_error(e, start_page, end_page);
                error!(start_page, end_page, error = %err, "Work unit failed");
                Err(err)
            }
        }
    }
}

/// Map a pool failure onto the request error for pages `start_page..=end_page`
fn unit_error(err: PoolError, start_page: usize, end_page: usize) -> ParseError {
    match err {
        PoolError::Acquire { waited_ms } => ParseError::Resource { waited_ms },
        PoolError::Closed => ParseError::ShuttingDown,
        PoolError::Timeout { limit_ms } => ParseError::Timeout {
            start_page,
            end_page,
            limit_ms,
        },
        PoolError::Failed(e) => ParseError::PartialFailure {
            start_page,
            end_page,
            reason: e.to_string(),
        },
        PoolError::Panicked(msg) => ParseError::PartialFailure {
            start_page,
            end_page,
            reason: format!("worker panicked: {msg}"),
        },
    }
}

/// Sets the shared cancellation flag unless disarmed
struct CancelOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl CancelOnDrop {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn flag(&self) -> Arc<AtomicBool> {
        self.flag.clone()
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::Relaxed);
        }
    }
}
