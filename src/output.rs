//! Output types: the library-level conversion result and the wire-level
//! per-file record.
//!
//! [`ConversionOutput`] is what the `convert*` entry points return: the
//! assembled Markdown plus per-page diagnostics, so callers can tell which
//! pages fell back to OCR and which OCR attempts failed without re-parsing
//! the Markdown. [`ConversionResult`] is the JSON record the batch endpoint
//! emits per uploaded file; success and error are separate enum variants so
//! a record can never carry both `content` and `error`.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// Document-level metadata read from the PDF info dictionary.
///
/// All string fields are `None` when the document does not set them —
/// most PDFs in the wild fill in only `producer`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: Option<String>,
    pub is_encrypted: bool,
}

/// Diagnostics for a single converted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-based page number, matching the `## Page {n}` marker.
    pub page_num: usize,
    /// Characters of native text after trimming (the OCR-decision input).
    pub text_chars: usize,
    /// Non-empty tables emitted for this page.
    pub table_count: usize,
    /// Whether the OCR fallback ran (text_chars was under the threshold).
    pub ocr_attempted: bool,
    /// Characters of recognized text embedded under `### OCR Content`.
    pub ocr_chars: usize,
    /// OCR-step failure, if any. The page itself still appears in the
    /// Markdown with an inline `### OCR Error` annotation.
    pub error: Option<PageError>,
    /// Wall-clock time spent on this page.
    pub duration_ms: u64,
}

impl PageReport {
    /// True when the page completed without an OCR-step failure.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counters for one document conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub pages_with_text: usize,
    pub table_count: usize,
    pub ocr_attempted_pages: usize,
    pub ocr_failed_pages: usize,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Fold per-page reports into document totals.
    pub fn from_reports(reports: &[PageReport], total_duration_ms: u64) -> Self {
        Self {
            total_pages: reports.len(),
            pages_with_text: reports.iter().filter(|p| p.text_chars > 0).count(),
            table_count: reports.iter().map(|p| p.table_count).sum(),
            ocr_attempted_pages: reports.iter().filter(|p| p.ocr_attempted).count(),
            ocr_failed_pages: reports.iter().filter(|p| p.error.is_some()).count(),
            total_duration_ms,
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled Markdown, starting with the page 1 marker.
    pub markdown: String,
    /// One report per page, in page order.
    pub pages: Vec<PageReport>,
    /// Metadata from the PDF info dictionary.
    pub metadata: DocumentMetadata,
    /// Aggregate counters.
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Iterate over the OCR-step failures, if any pages had them.
    pub fn page_failures(&self) -> impl Iterator<Item = &PageError> {
        self.pages.iter().filter_map(|p| p.error.as_ref())
    }
}

/// Per-file outcome record for batch conversion.
///
/// Serializes as `{"filename": ..., "status": "success", "content": ...}`
/// or `{"filename": ..., "status": "error", "error": ...}` — the shape
/// browser clients of the upload endpoint consume. The two-variant enum
/// makes `content` on a failed file (or `error` on a successful one)
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConversionResult {
    Success { filename: String, content: String },
    Error { filename: String, error: String },
}

impl ConversionResult {
    pub fn success(filename: impl Into<String>, content: impl Into<String>) -> Self {
        ConversionResult::Success {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn error(filename: impl Into<String>, error: impl Into<String>) -> Self {
        ConversionResult::Error {
            filename: filename.into(),
            error: error.into(),
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            ConversionResult::Success { filename, .. } => filename,
            ConversionResult::Error { filename, .. } => filename,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }
}
