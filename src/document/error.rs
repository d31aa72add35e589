//! Document error types
//!
//! Errors raised while opening a document or reading page layouts.

use thiserror::Error;

/// Backend-level document error
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Bytes are not a supported document format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Document could not be opened (corrupt, encrypted, truncated)
    #[error("Failed to open document: {0}")]
    OpenError(String),

    /// Page index outside the document
    #[error("Page {0} not found (document has {1} pages)")]
    PageNotFound(usize, usize),

    /// Structured text could not be read from a page
    #[error("Text extraction error on page {page}: {reason}")]
    TextExtraction { page: usize, reason: String },

    /// The work unit was told to stop
    #[error("Extraction cancelled")]
    Cancelled,

    /// MuPDF context error
    #[error("MuPDF error: {0}")]
    ContextError(String),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result (used by the backend implementations)
pub type DocumentResult<T> = Result<T>;

#[cfg(feature = "mupdf")]
impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::ContextError(err.to_string())
    }
}
