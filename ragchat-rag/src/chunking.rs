//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! cuts every page into fixed-size character windows with a constant overlap.

use std::collections::HashMap;

use ragchat_core::{RagChatError, Result};

use crate::document::{Document, Passage};

/// A strategy for splitting documents into passages.
///
/// Implementations must be deterministic: the same document always yields the
/// same passages in the same order.
pub trait Chunker: Send + Sync {
    /// Split a document into passages.
    ///
    /// Passages are numbered with a corpus-wide `ordinal` in emission order.
    fn split(&self, document: &Document) -> Vec<Passage>;
}

/// Splits each page into windows of at most `chunk_size` characters where
/// consecutive windows share exactly `chunk_overlap` characters.
///
/// Sizes count Unicode scalar values, so multi-byte text is never cut inside
/// a character. A passage never spans two pages. A page no longer than
/// `chunk_size` becomes exactly one passage; blank pages produce none.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1000, 50)?;
/// let passages = chunker.split(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per passage
    /// * `chunk_overlap`: number of characters shared by consecutive passages
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] unless `chunk_size > chunk_overlap`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(RagChatError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Character windows `(start, end)` over a text of `len` characters.
    fn windows(&self, len: usize) -> Vec<(usize, usize)> {
        let step = self.chunk_size - self.chunk_overlap;
        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(len);
            windows.push((start, end));
            if end == len {
                break;
            }
            start += step;
        }
        windows
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, document: &Document) -> Vec<Passage> {
        let mut passages = Vec::new();

        for page in &document.pages {
            if page.text.trim().is_empty() {
                continue;
            }

            // Byte offset of every char boundary, plus the end of the string.
            let mut bounds: Vec<usize> = page.text.char_indices().map(|(i, _)| i).collect();
            bounds.push(page.text.len());
            let char_len = bounds.len() - 1;

            for (chunk_index, (start, end)) in self.windows(char_len).into_iter().enumerate() {
                let mut metadata = HashMap::new();
                metadata.insert("chunk_index".to_string(), chunk_index.to_string());
                metadata.insert("char_start".to_string(), start.to_string());

                passages.push(Passage {
                    id: format!("{}#p{}_{chunk_index}", page.source, page.page_number),
                    text: page.text[bounds[start]..bounds[end]].to_string(),
                    page_number: page.page_number,
                    source: page.source.clone(),
                    ordinal: passages.len(),
                    metadata,
                });
            }
        }

        passages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn short_page_yields_single_identical_passage() {
        let chunker = FixedSizeChunker::new(100, 10).unwrap();
        let doc = Document::from_text("Remote work is allowed.", "policy.txt");
        let passages = chunker.split(&doc);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "Remote work is allowed.");
        assert_eq!(passages[0].id, "policy.txt#p1_0");
    }

    #[test]
    fn consecutive_passages_overlap_exactly() {
        let chunker = FixedSizeChunker::new(8, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwxyz";
        let passages = chunker.split(&Document::from_text(text, "a.txt"));

        for pair in passages.windows(2) {
            let prev = chars(&pair[0].text);
            let next = chars(&pair[1].text);
            assert!(prev.len() <= 8);
            assert_eq!(&prev[prev.len() - 3..], &next[..3]);
        }
        let last = passages.last().unwrap();
        assert!(text.ends_with(&last.text));
    }

    #[test]
    fn exact_fit_does_not_emit_redundant_tail() {
        let chunker = FixedSizeChunker::new(8, 2).unwrap();
        let passages = chunker.split(&Document::from_text("abcdefgh", "a.txt"));
        assert_eq!(passages.len(), 1);
    }

    #[test]
    fn never_spans_pages_and_skips_blank_ones() {
        let chunker = FixedSizeChunker::new(5, 1).unwrap();
        let doc = Document::new(vec![
            Page::new("aaaaaaa", 1, "d"),
            Page::new("   ", 2, "d"),
            Page::new("bbb", 3, "d"),
        ]);
        let passages = chunker.split(&doc);
        assert!(passages.iter().all(|p| p.text.chars().all(|c| c == 'a' || c == 'b')));
        assert!(passages.iter().all(|p| p.page_number != 2));
        assert_eq!(passages.last().unwrap().text, "bbb");
        let ordinals: Vec<usize> = passages.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, (0..passages.len()).collect::<Vec<_>>());
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let chunker = FixedSizeChunker::new(3, 1).unwrap();
        let passages = chunker.split(&Document::from_text("días señor", "es.txt"));
        assert!(passages.iter().all(|p| p.text.chars().count() <= 3));
        assert_eq!(passages[0].text, "día");
    }

    #[test]
    fn rejects_invalid_sizes() {
        assert!(FixedSizeChunker::new(10, 10).is_err());
        assert!(FixedSizeChunker::new(0, 0).is_err());
    }
}
