//! Document extraction backend: the seam between the page pipeline and the
//! native PDF library.
//!
//! The pipeline never touches pdfium directly. It consumes two traits:
//!
//! * [`PageSource`] — an opened document: page count, per-page native text,
//!   per-page detected tables, and on-demand rasterisation for OCR.
//! * [`DocumentOpener`] — opens a path into a `PageSource`. Injectable via
//!   [`crate::ConversionConfig::opener`] so the whole pipeline (and the HTTP
//!   server above it) runs against fake documents in tests, with no
//!   libpdfium on the machine.
//!
//! The built-in pdfium backend does not implement `DocumentOpener`: a pdfium
//! document handle borrows the library instance, so the conversion path
//! constructs both inside a single blocking call instead (see
//! [`pdfium::open_document`]).

pub mod pdfium;
pub mod tables;

use crate::output::DocumentMetadata;
use crate::PdfmillError;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

/// A table recovered from a page: rows of optional cells.
///
/// The grid is not guaranteed rectangular; the first row defines the column
/// count for rendering and later rows may be shorter or longer. `None`
/// marks a column position with no text under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Column count as defined by the first row (0 for an empty grid).
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors from the extraction backend, before the pipeline classifies them
/// as fatal ([`PdfmillError::ExtractionFailed`]) or page-contained
/// ([`crate::error::PageError::RenderFailed`]).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The native text layer could not be read.
    #[error("text layer unavailable: {0}")]
    Text(String),

    /// Text-geometry extraction for table detection failed.
    #[error("table extraction failed: {0}")]
    Tables(String),

    /// Rendering the page to a bitmap failed.
    #[error("page render failed: {0}")]
    Render(String),
}

/// An opened document the pipeline can pull pages from.
///
/// Implementations must hand out pages by 0-based index; the pipeline
/// renumbers 1-based for output and reporting.
pub trait PageSource {
    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Native text-layer content of one page. Empty string when the page
    /// has no text layer.
    fn text(&self, index: usize) -> Result<String, SourceError>;

    /// Tables detected on one page, top to bottom.
    fn tables(&self, index: usize) -> Result<Vec<Table>, SourceError>;

    /// Rasterise one page at the given DPI, for OCR.
    fn render(&self, index: usize, dpi: u32) -> Result<DynamicImage, SourceError>;

    /// Document metadata. The default fills in the page count only.
    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            page_count: self.page_count(),
            ..DocumentMetadata::default()
        }
    }
}

/// Opens a document file into a [`PageSource`].
///
/// Called on a blocking thread; the returned source only needs to live for
/// the duration of one conversion.
pub trait DocumentOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource + '_>, PdfmillError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn column_count_comes_from_first_row() {
        let t = Table {
            rows: vec![
                vec![cell("a"), cell("b"), cell("c")],
                vec![cell("1")],
            ],
        };
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.row_count(), 2);
        assert!(!t.is_empty());
    }

    #[test]
    fn empty_grid() {
        let t = Table { rows: vec![] };
        assert_eq!(t.column_count(), 0);
        assert!(t.is_empty());
    }
}
