//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different extraction backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! PageSource ──▶ compose ──────────────────▶ Markdown + PageReports
//!  (opened        per page:
//!   document)     marker → text → tables → OCR fallback
//!                           (format_table)  (OcrEngine)
//! ```
//!
//! 1. [`compose`] — the page reconciliation loop: emits the page-break
//!    marker, native text, formatted tables, and the OCR fallback for
//!    near-empty pages; OCR failures are contained to their page
//! 2. [`tables`]  — pure GFM table rendering from a detected cell grid

pub mod compose;
pub mod tables;

pub use compose::{compose_document, page_marker, MarkdownFragment};
pub use tables::format_table;
