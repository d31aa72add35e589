//! MuPDF backend
//!
//! Implements [`DocumentBackend`](crate::document::DocumentBackend) on top of
//! the MuPDF library.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. Nothing MuPDF-owned crosses a
//! thread boundary here: each work unit opens a fresh document from the shared
//! bytes on its own worker thread and drops it before the unit completes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_parse_server::document::DocumentBackend;
//! use pdf_parse_server::mupdf::MupdfBackend;
//!
//! let source = MupdfBackend::new().open(&pdf_bytes)?;
//! let layout = source.page_layout(0)?;
//! ```

mod backend;
mod stext;

pub use backend::MupdfBackend;
pub use stext::extract_page_layout;
