//! # pdfmill
//!
//! Convert PDF documents to Markdown: native text extraction, positional
//! table reconstruction, and a tesseract OCR fallback for scanned pages.
//!
//! ## Why this crate?
//!
//! Most PDFs carry a perfectly good text layer, and shipping every page
//! through an OCR engine wastes time and mangles what was already clean.
//! pdfmill reads the text layer first, rebuilds tables from glyph positions
//! as GitHub-flavoured Markdown, and rasterises a page for OCR only when
//! its native text is too thin to be the real content — scanned pages,
//! image-only pages, vector-art covers.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate  magic bytes, readability (fail fast, no partial output)
//!  ├─ 2. OCR check tesseract probed (or injected) before the PDF is opened
//!  ├─ 3. Open      pdfium binding, password handling, metadata
//!  └─ 4. Compose   per page: `## Page {n}` marker → native text → tables
//!                  → OCR fallback when the text layer is below threshold
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmill::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} pages, {} OCRed, {}ms total",
//!         output.stats.total_pages,
//!         output.stats.ocr_attempted_pages,
//!         output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | HTTP API and the `pdfmill` binary (axum + tower-http + clap) |
//!
//! Disable `server` when using only the library to avoid the HTTP stack:
//! ```toml
//! pdfmill = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod ocr;
pub mod output;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{DocumentOpener, PageSource, Table};
pub use batch::{convert_batch, UploadedFile};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_from_bytes, convert_sync, convert_to_file, inspect};
pub use error::{PageError, PdfmillError};
pub use ocr::{OcrCapability, OcrEngine, TesseractOcr};
pub use output::{
    ConversionOutput, ConversionResult, ConversionStats, DocumentMetadata, PageReport,
};
pub use pipeline::page_marker;
