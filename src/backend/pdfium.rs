//! The pdfium-backed [`PageSource`]: native text, text-geometry tables,
//! and page rasterisation for OCR.
//!
//! ## Why runtime binding?
//!
//! pdfium ships as a platform shared library, not a Rust crate. Binding at
//! runtime keeps the build free of C++ toolchain requirements and lets
//! operators point `PDFIUM_LIB_PATH` at whatever copy their distro or
//! container image carries. Resolution order: `PDFIUM_LIB_PATH`, then the
//! executable's directory, then the system library path.
//!
//! ## Lifetime note
//!
//! A `PdfDocument` borrows the `Pdfium` instance, so a `PdfiumSource`
//! cannot be returned through [`super::DocumentOpener`]. The conversion
//! path constructs library, document, and source together inside one
//! blocking call and drops them together when the document is done.

use super::tables::{detect_tables, TextSpan};
use super::{PageSource, SourceError, Table};
use crate::error::PdfmillError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

const POINTS_PER_INCH: f32 = 72.0;

/// Bind the pdfium shared library.
pub fn bind_pdfium() -> Result<Pdfium, PdfmillError> {
    if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        return Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            .map(Pdfium::new)
            .map_err(|e| PdfmillError::PdfiumBindingFailed(format!("{:?}", e)));
    }
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| PdfmillError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// Open a document, mapping pdfium's password failures onto the
/// password-specific error variants.
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfmillError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                PdfmillError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                PdfmillError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            PdfmillError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// [`PageSource`] over an opened pdfium document.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    max_pixels: u32,
}

impl<'a> PdfiumSource<'a> {
    pub fn new(document: PdfDocument<'a>, max_pixels: u32) -> Self {
        Self {
            document,
            max_pixels,
        }
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn text(&self, index: usize) -> Result<String, SourceError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| SourceError::Text(format!("{:?}", e)))?;
        let text = page
            .text()
            .map_err(|e| SourceError::Text(format!("{:?}", e)))?;
        Ok(text.all())
    }

    fn tables(&self, index: usize) -> Result<Vec<Table>, SourceError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| SourceError::Tables(format!("{:?}", e)))?;
        let text = page
            .text()
            .map_err(|e| SourceError::Tables(format!("{:?}", e)))?;

        let spans: Vec<TextSpan> = text
            .segments()
            .iter()
            .map(|segment| {
                let bounds = segment.bounds();
                TextSpan {
                    text: segment.text(),
                    left: bounds.left.value,
                    right: bounds.right.value,
                    top: bounds.top.value,
                    bottom: bounds.bottom.value,
                }
            })
            .collect();

        Ok(detect_tables(&spans))
    }

    fn render(&self, index: usize, dpi: u32) -> Result<DynamicImage, SourceError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| SourceError::Render(format!("{:?}", e)))?;

        // Target width in pixels from the page's physical width; pdfium
        // scales height proportionally. The pixel cap bounds memory on
        // oversized pages regardless of DPI.
        let scale = dpi as f32 / POINTS_PER_INCH;
        let target_width = (page.width().value * scale).round() as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width.max(1))
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| SourceError::Render(format!("{:?}", e)))?;

        let image = bitmap.as_image();
        debug!(
            "rendered page {} at {} dpi → {}x{} px",
            index + 1,
            dpi,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let pages = self.document.pages();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: pages.len() as usize,
            pdf_version: Some(format!("{:?}", self.document.version())),
            is_encrypted: false, // pdfium doesn't readily expose this after opening
        }
    }
}
