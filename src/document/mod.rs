//! Document abstraction
//!
//! Backend-neutral page layout types and the trait seam the parser uses to
//! open documents.
//!
//! ```text
//! ┌──────────────────────────┐
//! │     ParseOrchestrator    │
//! └────────────┬─────────────┘
//!              │ open(bytes) per work unit
//!              ▼
//! ┌──────────────────────────┐      ┌──────────────────────┐
//! │  dyn DocumentBackend     │ ───▶ │  Box<dyn PageSource> │
//! │  (MuPDF, test fakes)     │      │  page_layout(i)      │
//! └──────────────────────────┘      └──────────────────────┘
//! ```

mod error;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult, Result};
pub use traits::{DocumentBackend, PageSource};
pub use types::{DocumentFormat, LayoutBlock, LayoutLine, PageLayout, Rect, TextSpan};
