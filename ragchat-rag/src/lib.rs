//! # ragchat-rag
//!
//! The retrieval half of ragchat: load a corpus into pages, split pages into
//! overlapping passages, embed them into an immutable [`VectorIndex`], and
//! retrieve the top-k passages for a query with a [`Retriever`].
//!
//! ## Features
//!
//! - `openai`: [`OpenAIEmbeddingProvider`](openai::OpenAIEmbeddingProvider)
//!   for OpenAI-compatible `/embeddings` endpoints.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod retriever;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Document, Page, Passage, RetrievedSet, SearchResult};
pub use embedding::EmbeddingProvider;
pub use index::VectorIndex;
pub use loader::{DocumentLoader, TextLoader};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
