//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across requests, log them at startup, and diff
//! two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::backend::DocumentOpener;
use crate::error::PdfmillError;
use crate::ocr::OcrCapability;
use std::fmt;
use std::sync::Arc;

/// Default raster resolution for OCR page images, in dots per inch.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Default minimum trimmed-text length below which a page is OCRed.
pub const DEFAULT_OCR_TEXT_THRESHOLD: usize = 20;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfmill::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .ocr_dpi(300)
///     .ocr_language("deu")
///     .batch_concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Raster resolution used when rendering a page for OCR, in DPI.
    /// Range: 72–600. Default: 300.
    ///
    /// 300 DPI is what tesseract's own documentation recommends for body
    /// text: character strokes stay several pixels wide, so recognition
    /// accuracy holds up on 9–10 pt fonts. Lower values render faster but
    /// degrade small print; higher values rarely improve accuracy and
    /// quadratically inflate the page bitmap.
    pub ocr_dpi: u32,

    /// Minimum trimmed-text length (in characters) a page needs to skip OCR.
    /// Default: 20.
    ///
    /// Pages with at least this many characters of native text are trusted
    /// as text pages; anything shorter is treated as image-only (scans often
    /// carry a stray page number or watermark in the text layer) and sent to
    /// OCR. The comparison is strict: exactly-threshold text does NOT
    /// trigger OCR. Set to 0 to disable OCR entirely.
    pub ocr_text_threshold: usize,

    /// Tesseract language code passed via `-l`, e.g. "eng", "deu", "fra".
    /// Default: "eng".
    pub ocr_language: String,

    /// Override for the tesseract executable. If None, `tesseract` is looked
    /// up on PATH.
    pub tesseract_cmd: Option<String>,

    /// Maximum rendered image dimension (width or height) in pixels.
    /// Default: 4000.
    ///
    /// A safety cap independent of DPI. A 300-DPI render of an A0 poster
    /// would produce a 9 900 × 14 000 px image and exhaust memory. This
    /// caps either dimension while pdfium scales the other proportionally.
    /// 4 000 comfortably fits a US-letter page at 300 DPI (2 550 × 3 300).
    pub max_rendered_pixels: u32,

    /// Detect and emit tables from the page's text geometry. Default: true.
    ///
    /// Detection is heuristic (aligned text columns), so callers processing
    /// documents known to be prose-only can switch it off to avoid the
    /// occasional false positive.
    pub extract_tables: bool,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Number of documents converted concurrently by the batch entry point.
    /// Default: 4.
    ///
    /// Each document occupies one blocking thread (pdfium render + tesseract
    /// subprocess), so this is CPU/memory-bound rather than network-bound.
    /// Pages within a document are always sequential regardless.
    pub batch_concurrency: usize,

    /// Pre-resolved OCR capability. If None, tesseract is probed per
    /// conversion call.
    ///
    /// The server probes once at startup and injects the result here, so
    /// requests never pay the probe. Tests inject fake engines the same way.
    pub ocr: Option<OcrCapability>,

    /// Alternative document backend. If None, the built-in pdfium backend
    /// opens the file.
    pub opener: Option<Arc<dyn DocumentOpener>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_text_threshold: DEFAULT_OCR_TEXT_THRESHOLD,
            ocr_language: "eng".to_string(),
            tesseract_cmd: None,
            max_rendered_pixels: 4000,
            extract_tables: true,
            password: None,
            batch_concurrency: 4,
            ocr: None,
            opener: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("ocr_dpi", &self.ocr_dpi)
            .field("ocr_text_threshold", &self.ocr_text_threshold)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("extract_tables", &self.extract_tables)
            .field("batch_concurrency", &self.batch_concurrency)
            .field("ocr", &self.ocr)
            .field("opener", &self.opener.as_ref().map(|_| "<dyn DocumentOpener>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn ocr_text_threshold(mut self, chars: usize) -> Self {
        self.config.ocr_text_threshold = chars;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = Some(cmd.into());
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn extract_tables(mut self, v: bool) -> Self {
        self.config.extract_tables = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn batch_concurrency(mut self, n: usize) -> Self {
        self.config.batch_concurrency = n.max(1);
        self
    }

    pub fn ocr(mut self, capability: OcrCapability) -> Self {
        self.config.ocr = Some(capability);
        self
    }

    pub fn opener(mut self, opener: Arc<dyn DocumentOpener>) -> Self {
        self.config.opener = Some(opener);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Setters clamp on the way in, but the fields are public so a config
    /// assembled by hand is re-checked here.
    pub fn build(self) -> Result<ConversionConfig, PdfmillError> {
        let c = &self.config;
        if c.ocr_dpi < 72 || c.ocr_dpi > 600 {
            return Err(PdfmillError::InvalidConfig(format!(
                "OCR DPI must be 72–600, got {}",
                c.ocr_dpi
            )));
        }
        if c.batch_concurrency == 0 {
            return Err(PdfmillError::InvalidConfig(
                "Batch concurrency must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.is_empty() {
            return Err(PdfmillError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrCapability;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.ocr_dpi, 300);
        assert_eq!(c.ocr_text_threshold, 20);
        assert_eq!(c.ocr_language, "eng");
        assert_eq!(c.max_rendered_pixels, 4000);
        assert!(c.extract_tables);
        assert_eq!(c.batch_concurrency, 4);
        assert!(c.ocr.is_none());
        assert!(c.opener.is_none());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConversionConfig::builder()
            .ocr_dpi(10_000)
            .max_rendered_pixels(1)
            .batch_concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.ocr_dpi, 600);
        assert_eq!(c.max_rendered_pixels, 100);
        assert_eq!(c.batch_concurrency, 1);

        let low = ConversionConfig::builder().ocr_dpi(1).build().unwrap();
        assert_eq!(low.ocr_dpi, 72);
    }

    #[test]
    fn build_rejects_hand_assembled_invalid_dpi() {
        let mut builder = ConversionConfig::builder();
        builder.config.ocr_dpi = 9999;
        assert!(matches!(
            builder.build(),
            Err(PdfmillError::InvalidConfig(_))
        ));
    }

    #[test]
    fn build_rejects_empty_language() {
        let mut builder = ConversionConfig::builder();
        builder.config.ocr_language = String::new();
        assert!(builder.build().is_err());
    }

    #[test]
    fn debug_elides_injected_handles() {
        let c = ConversionConfig::builder()
            .ocr(OcrCapability::unavailable("test"))
            .build()
            .unwrap();
        let dbg = format!("{:?}", c);
        assert!(dbg.contains("ocr_dpi"));
        assert!(!dbg.contains("Arc"));
    }
}
