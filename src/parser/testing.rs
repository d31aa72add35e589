//! Synthetic layouts and an in-memory backend for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::document::{
    DocumentBackend, DocumentError, DocumentFormat, LayoutBlock, LayoutLine, PageLayout,
    PageSource, Rect, Result, TextSpan,
};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const LINE_HEIGHT: f32 = 10.0;

/// Minimal bytes the fake backend accepts
pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n%fake\n";

pub fn page(index: usize) -> PageLayout {
    PageLayout {
        index,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        ..Default::default()
    }
}

pub fn span(text: &str, x0: f32, y0: f32, x1: f32) -> TextSpan {
    TextSpan {
        bbox: Rect::new(x0, y0, x1, y0 + LINE_HEIGHT),
        text: text.to_string(),
    }
}

pub fn line(spans: Vec<TextSpan>) -> LayoutLine {
    let bbox = spans
        .iter()
        .map(|s| s.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default();
    LayoutLine {
        bbox,
        vertical: false,
        spans,
    }
}

pub fn block(lines: Vec<LayoutLine>) -> LayoutBlock {
    let bbox = lines
        .iter()
        .map(|l| l.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default();
    LayoutBlock { bbox, lines }
}

/// Paragraph block, one line per entry, starting at `top`
pub fn paragraph(top: f32, texts: &[&str]) -> LayoutBlock {
    let lines = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let y0 = top + i as f32 * (LINE_HEIGHT + 2.0);
            line(vec![span(text, 72.0, y0, 540.0)])
        })
        .collect();
    block(lines)
}

/// Table block: one line per row, one span per column range
pub fn table(top: f32, columns: &[(f32, f32)], rows: &[&[&str]]) -> LayoutBlock {
    let lines = rows
        .iter()
        .enumerate()
        .map(|(r, cells)| {
            let y0 = top + r as f32 * (LINE_HEIGHT + 2.0);
            line(
                columns
                    .iter()
                    .zip(cells.iter())
                    .map(|((x0, x1), text)| span(text, *x0, y0, *x1))
                    .collect(),
            )
        })
        .collect();
    block(lines)
}

/// `count` pages, each holding a single "Page N" paragraph
pub fn numbered_pages(count: usize) -> Vec<PageLayout> {
    (0..count)
        .map(|i| {
            let mut p = page(i);
            p.blocks.push(paragraph(100.0, &[&format!("Page {}", i + 1)]));
            p
        })
        .collect()
}

/// How a fake page misbehaves when loaded
#[derive(Debug, Clone)]
pub enum Fault {
    Error,
    Panic,
    Slow(Duration),
}

/// In-memory backend serving prebuilt layouts
#[derive(Debug, Default)]
pub struct FakeBackend {
    pages: Vec<PageLayout>,
    faults: HashMap<usize, Fault>,
    open_delay: Option<Duration>,
    opens: AtomicUsize,
    opening: AtomicUsize,
    peak_opening: AtomicUsize,
}

impl FakeBackend {
    pub fn new(pages: Vec<PageLayout>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn with_fault(mut self, index: usize, fault: Fault) -> Self {
        self.faults.insert(index, fault);
        self
    }

    /// Make every `open` take at least `delay`, like a real decode
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of times a document was opened
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Most documents ever being opened at the same moment
    pub fn peak_concurrent_opens(&self) -> usize {
        self.peak_opening.load(Ordering::SeqCst)
    }
}

impl DocumentBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn open(&self, data: &[u8]) -> Result<Box<dyn PageSource>> {
        if DocumentFormat::from_magic_bytes(data).is_none() {
            return Err(DocumentError::UnsupportedFormat("not a PDF".into()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.open_delay {
            let now = self.opening.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_opening.fetch_max(now, Ordering::SeqCst);
            thread::sleep(delay);
            self.opening.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(Box::new(FakeSource {
            pages: self.pages.clone(),
            faults: self.faults.clone(),
        }))
    }
}

struct FakeSource {
    pages: Vec<PageLayout>,
    faults: HashMap<usize, Fault>,
}

impl PageSource for FakeSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_layout(&self, index: usize) -> Result<PageLayout> {
        match self.faults.get(&index) {
            Some(Fault::Error) => {
                return Err(DocumentError::TextExtraction {
                    page: index + 1,
                    reason: "corrupt content stream".into(),
                })
            }
            Some(Fault::Panic) => panic!("malformed page tree at page {}", index + 1),
            Some(Fault::Slow(delay)) => thread::sleep(*delay),
            None => {}
        }
        self.pages
            .get(index)
            .cloned()
            .ok_or(DocumentError::PageNotFound(index + 1, self.pages.len()))
    }
}
