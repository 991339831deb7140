use super::{ExtractionError, PageText};

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    // pdf-extract returns all text as one string.
    // Split on form feed characters (\x0C) which typically separate pages.
    let trimmed = text.trim();
    if trimmed.is_empty() {
        // Extraction succeeded but found no text layer (scanned/image PDF).
        // The caller surfaces this as an empty-document input error.
        tracing::warn!("PDF contains no extractable text");
        return Ok(Vec::new());
    }

    let pages: Vec<PageText> = if text.contains('\x0C') {
        text.split('\x0C')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| PageText {
                page_number: (i + 1) as u32,
                text: page_text.trim().to_string(),
            })
            .collect()
    } else {
        vec![PageText {
            page_number: 1,
            text: trimmed.to_string(),
        }]
    };

    Ok(pages)
}
