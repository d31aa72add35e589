//! Element extraction over a window of contiguous pages
//!
//! A window is the page range handed to one work unit. Tables are detected
//! per page, then merged across the whole window so a table continuing onto
//! the next page is reported once with its full page span.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use super::config::ParseConfig;
use super::element::Element;
use super::tables::{detect_table_regions, group_rows, merge_regions, serialize_rows};
use crate::document::{
    DocumentError, LayoutBlock, LayoutLine, PageLayout, PageSource, Rect, Result, TextSpan,
};

/// Share of a block's area an image must cover for the block to count as
/// image text
pub const IMAGE_OVERLAP_THRESHOLD: f32 = 0.5;

/// Part of a table lying on one page
#[derive(Debug, Clone, Copy)]
struct TablePiece {
    /// Position within the window
    page: usize,
    rect: Rect,
}

/// Page plus its content area and offset in stacked space
struct WindowPage<'a> {
    layout: &'a PageLayout,
    content: Rect,
    offset: f32,
}

impl WindowPage<'_> {
    fn number(&self) -> usize {
        self.layout.index + 1
    }

    fn to_stacked(&self, rect: &Rect) -> Rect {
        let top = self.offset;
        let bottom = self.offset + self.content.height();
        Rect::new(
            rect.x0,
            (top + rect.y0 - self.content.y0).clamp(top, bottom),
            rect.x1,
            (top + rect.y1 - self.content.y0).clamp(top, bottom),
        )
    }

    /// Portion of a stacked rectangle falling on this page, in page space
    fn slice_of(&self, rect: &Rect) -> Option<Rect> {
        let top = self.offset;
        let bottom = self.offset + self.content.height();
        let y0 = rect.y0.max(top);
        let y1 = rect.y1.min(bottom);
        (y1 > y0).then(|| {
            Rect::new(
                rect.x0,
                self.content.y0 + (y0 - top),
                rect.x1,
                self.content.y0 + (y1 - top),
            )
        })
    }
}

/// Element with the position used to order output
struct Positioned {
    page: usize,
    top: f32,
    left: f32,
    element: Element,
}

/// Turns page layouts into ordered elements
#[derive(Debug, Clone)]
pub struct PageExtractor {
    header_margin: f32,
    footer_margin: f32,
    no_image_text: bool,
    tolerance: f32,
}

impl PageExtractor {
    pub fn new(config: &ParseConfig) -> Self {
        Self {
            header_margin: config.header_margin as f32,
            footer_margin: config.footer_margin as f32,
            no_image_text: config.no_image_text,
            tolerance: config.tolerance as f32,
        }
    }

    /// Region between the header and footer margins
    pub fn content_area(&self, page: &PageLayout) -> Rect {
        let top = self.header_margin.min(page.height);
        let bottom = (page.height - self.footer_margin).max(top);
        Rect::new(0.0, top, page.width, bottom)
    }

    /// Extract elements from contiguous pages, in reading order
    ///
    /// `pages` must be ordered by index without gaps.
    pub fn extract_window(&self, pages: &[PageLayout]) -> Vec<Element> {
        let mut offset = 0.0;
        let window: Vec<WindowPage<'_>> = pages
            .iter()
            .map(|layout| {
                let content = self.content_area(layout);
                let page = WindowPage {
                    layout,
                    content,
                    offset,
                };
                offset += content.height();
                page
            })
            .collect();

        // Lines surviving the margin and image filters, grouped by block
        let kept: Vec<Vec<Vec<&LayoutLine>>> = window
            .iter()
            .map(|page| {
                page.layout
                    .blocks
                    .iter()
                    .map(|block| self.kept_lines(page, block))
                    .collect()
            })
            .collect();

        let pieces = self.table_pieces(&window, &kept);
        let mut out: Vec<Positioned> = Vec::new();

        for table in &pieces {
            if let Some(positioned) = table_element(&window, &kept, table) {
                out.push(positioned);
            }
        }

        for (pos, page) in window.iter().enumerate() {
            let on_page: Vec<Rect> = pieces
                .iter()
                .flatten()
                .filter(|p| p.page == pos)
                .map(|p| p.rect)
                .collect();
            for lines in &kept[pos] {
                text_runs(page.number(), lines, &on_page, &mut out);
            }
        }

        out.sort_by(|a, b| {
            a.page
                .cmp(&b.page)
                .then(a.top.total_cmp(&b.top))
                .then(a.left.total_cmp(&b.left))
        });
        out.into_iter().map(|p| p.element).collect()
    }

    fn kept_lines<'a>(&self, page: &WindowPage<'_>, block: &'a LayoutBlock) -> Vec<&'a LayoutLine> {
        if self.no_image_text && covered_by_image(&block.bbox, &page.layout.images) {
            return Vec::new();
        }
        let area = page.content;
        block
            .lines
            .iter()
            .filter(|line| !line.vertical)
            .filter(|line| {
                let cy = line.bbox.center_y();
                cy > area.y0 && cy < area.y1
            })
            .collect()
    }

    /// Merged tables, each split into its per-page pieces
    fn table_pieces(
        &self,
        window: &[WindowPage<'_>],
        kept: &[Vec<Vec<&LayoutLine>>],
    ) -> Vec<Vec<TablePiece>> {
        let mut stacked = Vec::new();
        for (pos, page) in window.iter().enumerate() {
            let rows = group_rows(kept[pos].iter().flatten().flat_map(|line| &line.spans));
            let regions = detect_table_regions(&rows);
            if !regions.is_empty() {
                trace!(page = page.number(), count = regions.len(), "Detected table regions");
            }
            stacked.extend(regions.iter().map(|r| page.to_stacked(r)));
        }

        merge_regions(&stacked, self.tolerance)
            .iter()
            .map(|merged| {
                window
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, page)| {
                        page.slice_of(merged)
                            .map(|rect| TablePiece { page: pos, rect })
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|pieces| !pieces.is_empty())
            .collect()
    }
}

fn covered_by_image(block: &Rect, images: &[Rect]) -> bool {
    let area = block.area();
    if area <= 0.0 {
        return false;
    }
    images.iter().any(|image| {
        block
            .intersection(image)
            .is_some_and(|shared| shared.area() / area > IMAGE_OVERLAP_THRESHOLD)
    })
}

fn table_element(
    window: &[WindowPage<'_>],
    kept: &[Vec<Vec<&LayoutLine>>],
    pieces: &[TablePiece],
) -> Option<Positioned> {
    let first = pieces.first()?;
    let last = pieces.last()?;

    let content = pieces
        .iter()
        .map(|piece| {
            let spans = kept[piece.page]
                .iter()
                .flatten()
                .flat_map(|line| &line.spans)
                .filter(|s| claims(&piece.rect, s));
            serialize_rows(&group_rows(spans))
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if content.is_empty() {
        return None;
    }

    let start_page = window[first.page].number();
    Some(Positioned {
        page: start_page,
        top: first.rect.y0,
        left: first.rect.x0,
        element: Element::table(content, start_page, window[last.page].number()),
    })
}

/// Whether a table region takes `span`
///
/// Decided by the span's centre, both for table content and for the text
/// left around the table, so every span lands in exactly one element.
fn claims(table: &Rect, span: &TextSpan) -> bool {
    table.contains_point(span.bbox.center_x(), span.bbox.center_y())
}

/// Text of one line, or of what a table left of it
struct Fragment {
    bbox: Rect,
    text: String,
}

impl Fragment {
    fn of_spans(spans: &[&TextSpan]) -> Option<Self> {
        let bbox = spans.iter().map(|s| s.bbox).reduce(|a, b| a.union(&b))?;
        let text = spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Some(Self { bbox, text })
    }
}

/// Split a block's lines into text elements, breaking at table lines
///
/// Spans of a line that no table claims stay in the text, even when the
/// rest of the line went to a table.
fn text_runs(page: usize, lines: &[&LayoutLine], tables: &[Rect], out: &mut Vec<Positioned>) {
    let mut run: Vec<Fragment> = Vec::new();
    for line in lines {
        let free: Vec<&TextSpan> = line
            .spans
            .iter()
            .filter(|span| !tables.iter().any(|t| claims(t, span)))
            .collect();

        if free.len() == line.spans.len() {
            run.push(Fragment {
                bbox: line.bbox,
                text: line.text(),
            });
            continue;
        }

        flush_run(page, &mut run, out);
        run.extend(Fragment::of_spans(&free));
    }
    flush_run(page, &mut run, out);
}

fn flush_run(page: usize, run: &mut Vec<Fragment>, out: &mut Vec<Positioned>) {
    let Some(first) = run.first() else {
        return;
    };
    let bbox = run.iter().fold(first.bbox, |acc, f| acc.union(&f.bbox));
    let content = run
        .iter()
        .map(|f| f.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    run.clear();

    let content = content.trim();
    if content.is_empty() {
        return;
    }
    out.push(Positioned {
        page,
        top: bbox.y0,
        left: bbox.x0,
        element: Element::text(content, page),
    });
}

/// Load and extract the pages of one work unit
///
/// `cancel` is checked before each page; once set the unit stops with
/// [`DocumentError::Cancelled`].
pub fn extract_pages(
    source: &dyn PageSource,
    pages: Range<usize>,
    config: &ParseConfig,
    cancel: &AtomicBool,
) -> Result<Vec<Element>> {
    let mut layouts = Vec::with_capacity(pages.len());
    for index in pages {
        if cancel.load(Ordering::Relaxed) {
            return Err(DocumentError::Cancelled);
        }
        layouts.push(source.page_layout(index)?);
    }
    Ok(PageExtractor::new(config).extract_window(&layouts))
}
