//! PDF text extraction using pdf-extract.

use tracing::debug;

use crate::error::SourceError;
use crate::models::LoadedDocument;
use crate::models::storage_key::file_name_of;
use crate::utils::normalize_whitespace;

/// Extract the text of a PDF, with whitespace collapsed.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, SourceError> {
    // pdf-extract panics on some malformed files instead of returning Err.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| SourceError::PdfError("parser panicked".to_string()))?
        .map_err(|e| SourceError::PdfError(e.to_string()))?;

    let text = normalize_whitespace(&extracted);
    if text.is_empty() {
        return Err(SourceError::NoContent);
    }
    Ok(text)
}

pub(super) fn load(key: &str, body: &[u8]) -> Result<Vec<LoadedDocument>, SourceError> {
    let text = extract_pdf_text(body)?;
    debug!(key, chars = text.len(), "extracted PDF text");
    Ok(vec![LoadedDocument::new(text, file_name_of(key))])
}
