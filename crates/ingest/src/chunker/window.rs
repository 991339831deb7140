//! Window splitting and boundary seeking.

use heron_core::config::ChunkingConfig;
use uuid::Uuid;

use super::types::Chunk;
use crate::document::{clean, ExtractedDocument};

/// Chunk already-cleaned text into overlapping windows.
///
/// Text at or under `chunk_size` chars becomes a single chunk. Longer text
/// is windowed with `chunk_size - chunk_overlap` forward steps; each window
/// is shortened to the last paragraph or sentence break when one lies past
/// the midpoint of the window.
pub fn chunk_text(
    text: &str,
    source: &str,
    page_number: Option<u32>,
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    append_chunks(&mut chunks, text, source, page_number, config);
    chunks
}

/// Chunk an extracted document page by page. Pages are cleaned here; page
/// numbers are carried only for paginated sources and sequence indices run
/// across the whole document. No window ever spans a page boundary.
pub fn chunk_document(doc: &ExtractedDocument, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for page in &doc.pages {
        let cleaned = clean(&page.text);
        if cleaned.is_empty() {
            continue;
        }
        let page_number = doc.is_paginated().then_some(page.page_number);
        append_chunks(&mut chunks, &cleaned, &doc.source, page_number, config);
    }
    chunks
}

fn append_chunks(
    chunks: &mut Vec<Chunk>,
    text: &str,
    source: &str,
    page_number: Option<u32>,
    config: &ChunkingConfig,
) {
    for piece in split_windows(text, config.chunk_size, config.chunk_overlap) {
        chunks.push(Chunk {
            id: Uuid::new_v4().to_string(),
            text: piece,
            source: source.to_string(),
            page_number,
            sequence_index: chunks.len(),
            embedding: None,
        });
    }
}

/// Slide a `max_size`-char window over `text`, stepping `max_size - overlap`
/// forward, shortening at qualifying boundaries. The window start always
/// advances by at least one char, so the loop terminates even when boundary
/// shortening and a large overlap would otherwise step backwards.
fn split_windows(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.len() <= max_size {
        return vec![trimmed.to_string()];
    }

    let len = text.len();
    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < len {
        // The raw window end may hang off the text; it still drives the
        // forward step, matching the configured stride.
        let raw_end = start + max_size;
        let mut cut = raw_end;

        if raw_end < len {
            let window_end = floor_char_boundary(text, raw_end);
            if let Some(offset) = seek_boundary(&text[start..window_end], max_size) {
                cut = start + offset;
            }
        }

        let end = floor_char_boundary(text, cut.min(len));
        if end > start {
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }
        }

        start = cut.saturating_sub(overlap).max(start + 1);
    }

    pieces
}

/// Find where the window should end: one past the last paragraph break
/// (newline), else two past the last sentence break (". "), but only when
/// the break lies past the 50% mark of the window. `None` means hard cut.
fn seek_boundary(window: &str, max_size: usize) -> Option<usize> {
    let half = max_size / 2;

    if let Some(pos) = window.rfind('\n') {
        if pos > half {
            return Some(pos + 1);
        }
    }
    if let Some(pos) = window.rfind(". ") {
        if pos > half {
            return Some(pos + 2);
        }
    }
    None
}

/// Cleaned text is printable ASCII, so indices are already char boundaries;
/// this keeps slicing panic-free for any input regardless.
fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
