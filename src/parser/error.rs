//! Parse request errors
//!
//! Every failure aborts the whole request; partial element lists are never
//! returned alongside an error.

use thiserror::Error;

/// Request-level parse error
#[derive(Debug, Error)]
pub enum ParseError {
    /// Bytes do not decode as a document
    #[error("Invalid document: {0}")]
    Document(String),

    /// Configuration rejected before any work was dispatched
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No worker became available within the acquisition bound
    #[error("No worker available after {waited_ms} ms")]
    Resource { waited_ms: u64 },

    /// The worker pool has been closed for shutdown
    #[error("Parser service is shutting down")]
    ShuttingDown,

    /// A work unit failed; pages are 1-indexed and inclusive
    #[error("Extraction failed for pages {start_page}-{end_page}: {reason}")]
    PartialFailure {
        start_page: usize,
        end_page: usize,
        reason: String,
    },

    /// A work unit exceeded its execution bound; pages are 1-indexed and inclusive
    #[error("Extraction of pages {start_page}-{end_page} timed out after {limit_ms} ms")]
    Timeout {
        start_page: usize,
        end_page: usize,
        limit_ms: u64,
    },
}

impl ParseError {
    /// 1-indexed page range a unit-level failure refers to
    pub fn page_range(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::PartialFailure {
                start_page,
                end_page,
                ..
            }
            | ParseError::Timeout {
                start_page,
                end_page,
                ..
            } => Some((*start_page, *end_page)),
            _ => None,
        }
    }
}
