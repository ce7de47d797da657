//! The page reconciliation loop: native text, tables, and OCR fallback
//! merged into one deterministic Markdown stream.
//!
//! ## The page-break contract
//!
//! Every page contributes exactly one `\n## Page {n}\n\n` marker, in page
//! order, whatever else it contributes. Downstream consumers re-split the
//! document on that literal, so an N-page document always carries exactly
//! N markers — an empty page still gets its marker.
//!
//! ## Failure containment
//!
//! Text and table extraction read the document structure itself; a failure
//! there aborts the conversion ([`PdfmillError::ExtractionFailed`]). The
//! OCR step is different: it involves rasterisation and an external engine,
//! both of which fail on individual pages in the wild. [`ocr_page`] returns
//! `Result<String, PageError>` and the loop folds either arm into the
//! fragment — an `### OCR Error` annotation for the failed page, then on to
//! the next. No OCR failure can abort the document.

use std::time::Instant;

use tracing::{debug, warn};

use crate::backend::{PageSource, SourceError};
use crate::config::ConversionConfig;
use crate::error::{PageError, PdfmillError};
use crate::ocr::OcrEngine;
use crate::output::PageReport;
use crate::pipeline::tables::format_table;

/// The page-boundary marker. This literal is a wire contract; change it
/// and every consumer that splits on it breaks.
pub fn page_marker(page_num: usize) -> String {
    format!("\n## Page {}\n\n", page_num)
}

/// Ordered, append-only Markdown accumulator.
///
/// Segments are concatenated exactly once, in [`MarkdownFragment::finish`];
/// nothing is inspected or rewritten after it is pushed.
#[derive(Debug, Default)]
pub struct MarkdownFragment {
    segments: Vec<String>,
}

impl MarkdownFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Serialize the accumulated segments into the final document.
    pub fn finish(self) -> String {
        self.segments.concat()
    }
}

/// Convert every page of an opened document into Markdown.
///
/// Pages are processed strictly in order; the OCR engine must already be
/// resolved (availability is the caller's precondition, checked before the
/// document is opened).
pub fn compose_document(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    config: &ConversionConfig,
) -> Result<(String, Vec<PageReport>), PdfmillError> {
    let page_count = source.page_count();
    let mut fragment = MarkdownFragment::new();
    let mut reports = Vec::with_capacity(page_count);

    for index in 0..page_count {
        reports.push(compose_page(source, ocr, config, index, &mut fragment)?);
    }

    Ok((fragment.finish(), reports))
}

fn compose_page(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    config: &ConversionConfig,
    index: usize,
    fragment: &mut MarkdownFragment,
) -> Result<PageReport, PdfmillError> {
    let page_num = index + 1;
    let started = Instant::now();

    fragment.push(page_marker(page_num));

    // ── Native text ───────────────────────────────────────────────────────
    let text = source
        .text(index)
        .map_err(|e| extraction_failed(page_num, e))?;
    if !text.is_empty() {
        fragment.push(format!("{}\n\n", text));
    }

    // ── Tables ────────────────────────────────────────────────────────────
    let mut table_count = 0;
    if config.extract_tables {
        let tables = source
            .tables(index)
            .map_err(|e| extraction_failed(page_num, e))?;
        for table in &tables {
            if table.is_empty() {
                continue;
            }
            fragment.push(format_table(table));
            fragment.push("\n");
            table_count += 1;
        }
    }

    // ── OCR fallback ──────────────────────────────────────────────────────
    // The decision input is the TRIMMED character count: scans often carry
    // a stray page number or watermark in the text layer. Strictly-under
    // semantics: a page with exactly `ocr_text_threshold` chars is trusted.
    let text_chars = text.trim().chars().count();
    let mut ocr_attempted = false;
    let mut ocr_chars = 0;
    let mut error = None;

    if text_chars < config.ocr_text_threshold {
        ocr_attempted = true;
        match ocr_page(source, ocr, config, index, page_num) {
            Ok(recognized) => {
                let recognized = recognized.trim();
                if !recognized.is_empty() {
                    ocr_chars = recognized.chars().count();
                    fragment.push(format!("### OCR Content\n\n{}\n\n", recognized));
                }
            }
            Err(page_error) => {
                warn!("{}", page_error);
                fragment.push(format!("### OCR Error\n\n{}\n\n", page_error));
                error = Some(page_error);
            }
        }
    }

    debug!(
        "page {}: text_chars={} tables={} ocr={} ({} ms)",
        page_num,
        text_chars,
        table_count,
        if ocr_attempted { "yes" } else { "no" },
        started.elapsed().as_millis()
    );

    Ok(PageReport {
        page_num,
        text_chars,
        table_count,
        ocr_attempted,
        ocr_chars,
        error,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Render the page and run OCR on it. Both steps are page-contained.
fn ocr_page(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    config: &ConversionConfig,
    index: usize,
    page_num: usize,
) -> Result<String, PageError> {
    let image = source
        .render(index, config.ocr_dpi)
        .map_err(|e| PageError::RenderFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
    ocr.recognize(&image).map_err(|e| PageError::OcrFailed {
        page: page_num,
        detail: e.to_string(),
    })
}

fn extraction_failed(page: usize, e: SourceError) -> PdfmillError {
    PdfmillError::ExtractionFailed {
        page,
        detail: e.to_string(),
    }
}
