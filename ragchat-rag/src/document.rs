//! Data types for documents, passages, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One page of loaded text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// The raw page text.
    pub text: String,
    /// 1-based page number within its source.
    pub page_number: usize,
    /// The file or URI the page came from.
    pub source: String,
}

impl Page {
    pub fn new(text: impl Into<String>, page_number: usize, source: impl Into<String>) -> Self {
        Self { text: text.into(), page_number, source: source.into() }
    }
}

/// An ordered sequence of pages loaded from one corpus path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// The pages in reading order.
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Build a single-page document from a string.
    pub fn from_text(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self { pages: vec![Page::new(text, 1, source)] }
    }

    /// Return the page at `index` (0-based position in the document).
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// A bounded, contiguous span of one page's text.
///
/// Produced by a [`Chunker`](crate::Chunker) and owned by the
/// [`VectorIndex`](crate::VectorIndex) that embeds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Stable identifier: `{source}#p{page_number}_{chunk_index}`.
    pub id: String,
    /// The passage text.
    pub text: String,
    /// Page the passage was cut from.
    pub page_number: usize,
    /// Source of the parent page.
    pub source: String,
    /// Position in the corpus-wide passage sequence. Used to break score ties.
    pub ordinal: usize,
    /// Chunk-specific fields such as `chunk_index` and `char_start`.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Passage`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved passage.
    pub passage: Passage,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// The top-k passages for one standalone query, best first.
pub type RetrievedSet = Vec<SearchResult>;
