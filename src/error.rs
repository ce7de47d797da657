//! Error types for the pdfmill library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfmillError`] — **Fatal**: the conversion cannot proceed at all
//!   (bad input file, wrong password, no OCR engine installed). Returned as
//!   `Err(PdfmillError)` from the top-level `convert*` functions. A fatal
//!   error means no Markdown was produced for the document.
//!
//! * [`PageError`] — **Non-fatal**: the OCR step failed for a single page
//!   (raster glitch, tesseract crash) but all other pages are fine. Recorded
//!   in [`crate::output::PageReport`] and annotated inline in the Markdown
//!   under an `### OCR Error` heading, so one bad scan never costs the
//!   whole document.
//!
//! The separation is load-bearing: batch conversion maps `PdfmillError` to a
//! per-file error record, while `PageError` stays inside a successful file's
//! output.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfmill library.
///
/// Page-level OCR failures use [`PageError`] and are stored in
/// [`crate::output::PageReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfmillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nSet ConversionConfig::password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Native text or table extraction failed for a page.
    ///
    /// Unlike OCR, the text layer is read straight from the document
    /// structure; a failure here means the document itself is suspect, so
    /// the whole conversion aborts.
    #[error("Text extraction failed on page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// No usable OCR engine, checked before any page is processed.
    ///
    /// Conversion refuses to start rather than silently skipping OCR:
    /// image-only pages would otherwise come back empty with no indication
    /// that anything was missed.
    #[error("OCR engine unavailable: {reason}\nInstall tesseract (e.g. `apt-get install tesseract-ocr`) or inject an OcrCapability via ConversionConfig::ocr.")]
    OcrUnavailable { reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install pdfium and set PDFIUM_LIB_PATH=/path/to/dir containing libpdfium.\n\
  • Place the platform library (libpdfium.so / libpdfium.dylib / pdfium.dll)\n\
    next to the executable.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfmillError {
    /// True for the distinguished OCR-unavailable precondition failure.
    ///
    /// Callers that want to distinguish "service misconfigured" from
    /// "document is bad" (the HTTP layer maps the former to 503) match on
    /// this instead of string-comparing display output.
    pub fn is_ocr_unavailable(&self) -> bool {
        matches!(self, PdfmillError::OcrUnavailable { .. })
    }
}

/// A non-fatal error for the OCR step of a single page.
///
/// Stored in [`crate::output::PageReport`] when a page's OCR fails.
/// The overall conversion always continues to the next page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Rendering the page image for OCR failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The OCR engine failed on the rendered page image.
    #[error("Page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } => *page,
            PageError::OcrFailed { page, .. } => *page,
        }
    }
}
