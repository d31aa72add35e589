//! MuPDF document backend
//!
//! MuPDF's `fz_context` is not thread-safe, so a `mupdf::Document` is never
//! shared. Each work unit calls [`MupdfBackend::open`] on its own blocking
//! thread, reads its page window, and drops the document before returning.
//! Only the raw bytes travel between threads.

use mupdf::Document;

use crate::document::{
    DocumentBackend, DocumentError, DocumentFormat, DocumentResult, PageLayout, PageSource,
};

use super::stext;

/// Stateless MuPDF backend
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn open(&self, data: &[u8]) -> DocumentResult<Box<dyn PageSource>> {
        let format = DocumentFormat::from_magic_bytes(data)
            .ok_or_else(|| DocumentError::UnsupportedFormat("missing %PDF header".into()))?;

        let doc = Document::from_bytes(data, format.mime())
            .map_err(|e| DocumentError::OpenError(e.to_string()))?;

        if doc.needs_password()? {
            return Err(DocumentError::OpenError(
                "document is encrypted and requires a password".into(),
            ));
        }

        let page_count = doc
            .page_count()
            .map_err(|e| DocumentError::OpenError(e.to_string()))?;

        Ok(Box::new(MupdfSource {
            doc,
            page_count: usize::try_from(page_count).unwrap_or(0),
        }))
    }
}

/// An opened MuPDF document, confined to the thread that opened it
struct MupdfSource {
    doc: Document,
    page_count: usize,
}

impl PageSource for MupdfSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_layout(&self, index: usize) -> DocumentResult<PageLayout> {
        if index >= self.page_count {
            return Err(DocumentError::PageNotFound(index + 1, self.page_count));
        }

        let to_extraction_error = |e: mupdf::Error| DocumentError::TextExtraction {
            page: index + 1,
            reason: e.to_string(),
        };

        let page = self
            .doc
            .load_page(index as i32)
            .map_err(to_extraction_error)?;

        stext::extract_page_layout(&page, index).map_err(to_extraction_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal single empty page
    const MINIMAL_PDF: &[u8] = b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << >> >>
endobj
4 0 obj
<< /Length 0 >>
stream
endstream
endobj
xref
0 5
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000226 00000 n
trailer
<< /Size 5 /Root 1 0 R >>
startxref
276
%%EOF";

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let err = MupdfBackend::new().open(b"PK\x03\x04 not a pdf").err();
        assert!(matches!(err, Some(DocumentError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_open_minimal_pdf() {
        let source = MupdfBackend::new()
            .open(MINIMAL_PDF)
            .expect("minimal pdf should open");
        assert_eq!(source.page_count(), 1);

        let layout = source.page_layout(0).expect("page 1 layout");
        assert_eq!(layout.index, 0);
        assert!((layout.width - 612.0).abs() < 0.5);
        assert!((layout.height - 792.0).abs() < 0.5);
        assert!(layout.blocks.is_empty());
    }

    #[test]
    fn test_page_out_of_range() {
        let source = MupdfBackend::new().open(MINIMAL_PDF).expect("open");
        assert!(matches!(
            source.page_layout(3),
            Err(DocumentError::PageNotFound(4, 1))
        ));
    }
}
