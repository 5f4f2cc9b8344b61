//! PDF text extraction.
//!
//! Pages are extracted with `pdf_extract` and concatenated in page order with
//! no separator. Extraction is all-or-nothing: a failure anywhere, including a
//! panic inside the PDF library, yields [`PdfQaError::Extraction`] and no text.

use std::panic::{self, AssertUnwindSafe};

use crate::error::PdfQaError;
use crate::model::DocumentText;

const PDF_MIME: &str = "application/pdf";

/// Source of per-page text for a PDF byte stream.
pub trait PageExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfQaError>;
}

/// [`PageExtractor`] backed by the `pdf_extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractPages;

impl PageExtractor for PdfExtractPages {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfQaError> {
        validate_pdf_bytes(bytes)?;

        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
            PdfQaError::Extraction(format!("Failed to extract text from PDF: {}", e))
        })
    }
}

/// Check that `bytes` looks like a PDF before handing it to the library.
pub fn validate_pdf_bytes(bytes: &[u8]) -> Result<(), PdfQaError> {
    if bytes.is_empty() {
        return Err(PdfQaError::Extraction("uploaded file is empty".to_string()));
    }

    match infer::get(bytes) {
        Some(kind) if kind.mime_type() == PDF_MIME => Ok(()),
        Some(kind) => Err(PdfQaError::Extraction(format!(
            "expected a PDF file, got {}",
            kind.mime_type()
        ))),
        None => Err(PdfQaError::Extraction(
            "file does not start with a PDF header".to_string(),
        )),
    }
}

/// Extract the full text of the PDF in `bytes`.
///
/// `source` names the upload and is carried into the returned [`DocumentText`].
pub fn extract_text(
    extractor: &dyn PageExtractor,
    source: &str,
    bytes: &[u8],
) -> Result<DocumentText, PdfQaError> {
    tracing::debug!(source, size = bytes.len(), "extracting PDF text");

    // pdf_extract panics on some malformed inputs instead of returning an error
    let pages = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract_pages(bytes)))
        .map_err(|_| {
            tracing::warn!(source, "PDF extractor panicked");
            PdfQaError::Extraction(
                "PDF library aborted while reading the document (malformed PDF)".to_string(),
            )
        })??;
    let document = DocumentText::from_pages(source, &pages);

    // whitespace-only output is treated as no text at all
    if document.is_blank() {
        return Err(PdfQaError::Extraction(format!(
            "no extractable text in {} page(s); the document may be scanned or image-only",
            document.page_count
        )));
    }

    tracing::info!(
        source,
        pages = document.page_count,
        chars = document.char_count(),
        "extracted PDF text"
    );
    Ok(document)
}

/// Extract with the default `pdf_extract` backend.
pub fn extract_pdf(source: &str, bytes: &[u8]) -> Result<DocumentText, PdfQaError> {
    extract_text(&PdfExtractPages, source, bytes)
}
