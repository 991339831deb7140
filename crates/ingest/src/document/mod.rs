//! Document text extraction for supported source formats (TXT, PDF).

mod cleaner;
mod pdf;
mod txt;

pub use cleaner::clean;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number (for PDFs). For TXT, always 1.
    pub page_number: u32,
    /// The extracted raw text content.
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Source label carried onto every chunk (filename for file input).
    pub source: String,
    /// File type: "pdf" or "txt".
    pub kind: String,
    /// Extracted pages in order.
    pub pages: Vec<PageText>,
}

impl ExtractedDocument {
    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.len()).sum()
    }

    /// Whether the document is paginated (page numbers are meaningful).
    pub fn is_paginated(&self) -> bool {
        self.kind == "pdf"
    }
}

/// Extract text from file bytes based on file extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    let kind = ext.as_str();

    let pages = match kind {
        "pdf" => pdf::extract_pdf(bytes)?,
        "txt" | "text" => txt::extract_txt(bytes)?,
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    Ok(ExtractedDocument {
        source: filename.to_string(),
        kind: kind.to_string(),
        pages,
    })
}
