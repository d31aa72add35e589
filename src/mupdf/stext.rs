//! Structured Text Helpers
//!
//! Converts a MuPDF page into a backend-neutral [`PageLayout`]: text blocks,
//! lines split into spans at wide gaps, and image regions.

use mupdf::{Page, TextPageOptions, WriteMode};

use crate::document::{LayoutBlock, LayoutLine, PageLayout, Rect, TextSpan};

/// A gap wider than this many font sizes starts a new span within a line
const SPAN_GAP_EM: f32 = 1.0;

/// Extract the layout of a page
///
/// Coordinates are shifted so the page's top-left corner is the origin.
pub fn extract_page_layout(page: &Page, index: usize) -> Result<PageLayout, mupdf::Error> {
    // Image blocks are only reported when explicitly preserved
    let text_page = page.to_text_page(TextPageOptions::PRESERVE_IMAGES)?;
    let bounds = page.bounds()?;
    let (ox, oy) = (bounds.x0, bounds.y0);

    let to_rect = |r: mupdf::Rect| Rect::new(r.x0 - ox, r.y0 - oy, r.x1 - ox, r.y1 - oy);

    let mut blocks = Vec::new();
    let mut images = Vec::new();

    for block in text_page.blocks() {
        let bbox = to_rect(block.bounds());

        let mut lines = Vec::new();
        for line in block.lines() {
            let mut spans: Vec<TextSpan> = Vec::new();
            let mut current: Option<TextSpan> = None;

            for ch in line.chars() {
                let Some(c) = ch.char() else {
                    continue;
                };

                if c.is_whitespace() {
                    if let Some(span) = current.as_mut() {
                        span.text.push(c);
                    }
                    continue;
                }

                let quad = ch.quad();
                let rect = Rect::new(
                    quad.ul.x.min(quad.ll.x) - ox,
                    quad.ul.y.min(quad.ur.y) - oy,
                    quad.ur.x.max(quad.lr.x) - ox,
                    quad.ll.y.max(quad.lr.y) - oy,
                );
                let max_gap = ch.size() * SPAN_GAP_EM;

                let extends = current
                    .as_ref()
                    .is_some_and(|span| rect.x0 - span.bbox.x1 <= max_gap);

                if extends {
                    if let Some(span) = current.as_mut() {
                        span.bbox = span.bbox.union(&rect);
                        span.text.push(c);
                    }
                } else if let Some(done) = current.replace(TextSpan {
                    bbox: rect,
                    text: c.to_string(),
                }) {
                    spans.push(done);
                }
            }
            spans.extend(current);

            if spans.is_empty() {
                continue;
            }

            lines.push(LayoutLine {
                bbox: to_rect(line.bounds()),
                vertical: matches!(line.wmode(), WriteMode::Vertical),
                spans,
            });
        }

        if block.lines().next().is_none() {
            // Blocks without lines are images under PRESERVE_IMAGES
            images.push(bbox);
        } else if !lines.is_empty() {
            blocks.push(LayoutBlock { bbox, lines });
        }
    }

    Ok(PageLayout {
        index,
        width: bounds.x1 - bounds.x0,
        height: bounds.y1 - bounds.y0,
        blocks,
        images,
    })
}
