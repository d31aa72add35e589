//! PDF parse pipeline
//!
//! Page layouts come from a [`DocumentBackend`](crate::document::DocumentBackend);
//! this module turns them into ordered text and table elements, fanning the
//! pages of each request out over a bounded worker pool.

mod config;
mod element;
mod error;
mod extract;
mod orchestrator;
mod partition;
mod pool;
mod service;
mod tables;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    ParseConfig, ParseOverrides, DEFAULT_FOOTER_MARGIN, DEFAULT_HEADER_MARGIN,
    DEFAULT_MAX_PROCESSORS, DEFAULT_TOLERANCE,
};
pub use element::{ContentType, Element, ParseResult};
pub use error::ParseError;
pub use extract::{extract_pages, PageExtractor, IMAGE_OVERLAP_THRESHOLD};
pub use orchestrator::ParseOrchestrator;
pub use partition::partition_pages;
pub use pool::{PoolConfig, PoolError, PoolStats, WorkerPool};
pub use service::ParserService;
pub use tables::{detect_table_regions, group_rows, merge_regions, serialize_rows, Row};
