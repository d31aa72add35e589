//! Document traits
//!
//! Backend-agnostic interfaces for opening documents and reading page layouts.

use super::error::Result;
use super::types::PageLayout;

/// Opens raw document bytes
///
/// Implementations must be cheap to share across threads; every work unit
/// calls `open` on its own thread and never hands the returned source to
/// another thread.
pub trait DocumentBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Open a fresh document instance from bytes
    fn open(&self, data: &[u8]) -> Result<Box<dyn PageSource>>;
}

/// An opened document
pub trait PageSource {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Structured layout of a page (0-indexed)
    fn page_layout(&self, index: usize) -> Result<PageLayout>;
}
