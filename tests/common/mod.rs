//! Shared fixtures: a scriptable document backend and OCR engine so the
//! whole pipeline (and the HTTP server above it) runs without libpdfium or
//! tesseract installed.
//!
//! Fake documents are ordinary byte blobs: a `%PDF-FAKE` header line
//! (satisfying the magic-byte check) followed by page texts separated by
//! `===PAGE===` lines. A few directive values script failures:
//!
//! - whole body `OPEN-FAIL`    → opening the document fails
//! - whole body `NO-PAGES`     → a zero-page document
//! - page text `TEXT-FAIL`     → text extraction fails (fatal)
//! - page text `RENDER-FAIL`   → empty text, then rasterisation fails
//! - page line `[TABLE]`       → one fixed two-column table on that page

#![allow(dead_code)]

use image::DynamicImage;
use pdfmill::backend::{PageSource, SourceError, Table};
use pdfmill::ocr::OcrError;
use pdfmill::{
    ConversionConfig, DocumentOpener, OcrCapability, OcrEngine, PdfmillError,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

const PAGE_SEPARATOR: &str = "\n===PAGE===\n";

/// Serialise fake pages into upload bytes / file contents.
pub fn fake_pdf(pages: &[&str]) -> Vec<u8> {
    let mut blob = String::from("%PDF-FAKE\n");
    if pages.is_empty() {
        blob.push_str("NO-PAGES");
    } else {
        blob.push_str(&pages.join(PAGE_SEPARATOR));
    }
    blob.into_bytes()
}

pub struct FakeSource {
    pages: Vec<String>,
}

impl PageSource for FakeSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text(&self, index: usize) -> Result<String, SourceError> {
        let page = &self.pages[index];
        if page == "TEXT-FAIL" {
            return Err(SourceError::Text("scripted text failure".into()));
        }
        if page == "RENDER-FAIL" {
            return Ok(String::new());
        }
        if page.contains("[TABLE]") {
            let kept: Vec<&str> = page.lines().filter(|l| *l != "[TABLE]").collect();
            return Ok(kept.join("\n"));
        }
        Ok(page.clone())
    }

    fn tables(&self, index: usize) -> Result<Vec<Table>, SourceError> {
        if self.pages[index].contains("[TABLE]") {
            return Ok(vec![Table {
                rows: vec![
                    vec![Some("Name".into()), Some("Qty".into())],
                    vec![Some("bolt".into()), Some("7".into())],
                ],
            }]);
        }
        Ok(Vec::new())
    }

    fn render(&self, index: usize, _dpi: u32) -> Result<DynamicImage, SourceError> {
        if self.pages[index] == "RENDER-FAIL" {
            return Err(SourceError::Render("scripted render failure".into()));
        }
        Ok(DynamicImage::new_rgb8(2, 2))
    }
}

/// Opens `fake_pdf` blobs from disk. Injected via `ConversionConfig::opener`.
pub struct FakeOpener;

impl DocumentOpener for FakeOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource + '_>, PdfmillError> {
        let bytes = std::fs::read(path)
            .map_err(|e| PdfmillError::Internal(format!("fixture read: {e}")))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        // The magic check runs before open(), so the header line is
        // always %PDF-something by the time we get here.
        let body = match content.split_once('\n') {
            Some((_, body)) => body.to_string(),
            None => String::new(),
        };

        if body == "OPEN-FAIL" {
            return Err(PdfmillError::CorruptPdf {
                path: path.to_path_buf(),
                detail: "scripted open failure".into(),
            });
        }

        let pages = if body == "NO-PAGES" {
            Vec::new()
        } else {
            body.split(PAGE_SEPARATOR).map(str::to_string).collect()
        };
        Ok(Box::new(FakeSource { pages }))
    }
}

/// Scripted OCR engine: answers come off a queue, one per `recognize`
/// call. `Err` entries become engine failures; an exhausted queue keeps
/// answering with empty text.
pub struct QueueOcr {
    replies: Mutex<VecDeque<Result<String, String>>>,
}

impl QueueOcr {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl OcrEngine for QueueOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(stderr)) => Err(OcrError::Engine {
                command: "fake-ocr".into(),
                status: "exit status: 1".into(),
                stderr,
            }),
            None => Ok(String::new()),
        }
    }
}

/// Config wired to the fake backend and the given OCR script.
pub fn fake_config(ocr: QueueOcr) -> ConversionConfig {
    let mut config = ConversionConfig::default();
    config.opener = Some(Arc::new(FakeOpener));
    config.ocr = Some(OcrCapability::ready(ocr));
    config
}

/// Write a fake document to a temp file, returning the guard.
pub fn fake_pdf_file(pages: &[&str]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(&fake_pdf(pages)).expect("write fixture");
    tmp
}
