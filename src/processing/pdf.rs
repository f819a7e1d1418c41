//! PDF text extraction.

use super::types::PdfError;
use lopdf::Document;

/// Whether `filename` names a PDF. The extension check ignores ASCII case.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename
        .trim()
        .rsplit_once('.')
        .is_some_and(|(stem, extension)| !stem.is_empty() && extension.eq_ignore_ascii_case("pdf"))
}

/// Extract text page by page and join the pages with newlines.
///
/// Pages whose content cannot be decoded (typically image-only scans) contribute nothing. Returns
/// [`PdfError::NoText`] when the joined text is blank.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let document = Document::load_mem(bytes).map_err(|error| PdfError::Parse(error.to_string()))?;

    let pages: Vec<String> = document
        .get_pages()
        .into_keys()
        .map(|page_no| match document.extract_text(&[page_no]) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(page = page_no, error = %error, "Skipping unreadable PDF page");
                String::new()
            }
        })
        .collect();
    let text = pages.join("\n");

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }

    tracing::debug!(
        pages = pages.len(),
        characters = text.len(),
        "Extracted PDF text"
    );
    Ok(text)
}
