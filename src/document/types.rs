//! Core document types
//!
//! Backend-neutral page layout types. Coordinates are in points with the
//! origin at the top-left corner of the page and y growing downward.

use serde::{Deserialize, Serialize};

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PDF magic: %PDF, allowing leading junk within the first kilobyte
        // the way most readers do
        let head = &bytes[..bytes.len().min(1024)];
        if head.windows(4).any(|w| w == b"%PDF") {
            return Some(Self::Pdf);
        }

        None
    }

    /// MIME type handed to the backend when opening bytes
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
        }
    }
}

/// Axis-aligned rectangle in page space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Overlapping region, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (!r.is_empty()).then_some(r)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Horizontal distance between edges (0 when the x ranges overlap)
    pub fn gap_x(&self, other: &Rect) -> f32 {
        (other.x0 - self.x1).max(self.x0 - other.x1).max(0.0)
    }

    /// Vertical distance between edges (0 when the y ranges overlap)
    pub fn gap_y(&self, other: &Rect) -> f32 {
        (other.y0 - self.y1).max(self.y0 - other.y1).max(0.0)
    }

    /// Length of the shared y range
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Structured text of a single page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLayout {
    /// Zero-based page index within the document
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Text blocks in backend order
    pub blocks: Vec<LayoutBlock>,
    /// Raster image regions
    pub images: Vec<Rect>,
}

/// Text block (paragraph, cell group, heading)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub bbox: Rect,
    pub lines: Vec<LayoutLine>,
}

/// Text line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutLine {
    pub bbox: Rect,
    /// Top-to-bottom writing mode
    pub vertical: bool,
    /// Runs of text separated by wide horizontal gaps
    pub spans: Vec<TextSpan>,
}

impl LayoutLine {
    /// Line text with spans joined by a single space
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Contiguous run of characters within a line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextSpan {
    pub bbox: Rect,
    pub text: String,
}
