//! Parsed element types
//!
//! These are serialized verbatim as the parse endpoint's response body.

use serde::{Deserialize, Serialize};

/// Kind of content an element carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Table,
}

/// One unit of extracted content with its page span (1-indexed, inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub content: String,
    pub content_type: ContentType,
    pub start_page: usize,
    pub end_page: usize,
}

impl Element {
    /// Text element confined to a single page
    pub fn text(content: impl Into<String>, page: usize) -> Self {
        Self {
            content: content.into(),
            content_type: ContentType::Text,
            start_page: page,
            end_page: page,
        }
    }

    /// Table element spanning `start_page..=end_page`
    pub fn table(content: impl Into<String>, start_page: usize, end_page: usize) -> Self {
        debug_assert!(start_page <= end_page);
        Self {
            content: content.into(),
            content_type: ContentType::Table,
            start_page,
            end_page,
        }
    }
}

/// Outcome of parsing one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub elements: Vec<Element>,
    pub num_pages: usize,
}

impl ParseResult {
    /// Result for a document with no pages
    pub fn empty() -> Self {
        Self::default()
    }
}
