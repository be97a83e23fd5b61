//! Index construction pipeline.
//!
//! The [`RagPipeline`] coordinates corpus ingestion by composing a
//! [`DocumentLoader`], a [`Chunker`] and an [`EmbeddingProvider`]:
//! load → split → embed → [`VectorIndex`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat_rag::{RagPipeline, RagConfig, TextLoader};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .loader(Arc::new(TextLoader::new()))
//!     .build()?;
//!
//! let index = pipeline.build_index("handbook.txt".as_ref()).await?;
//! let retriever = pipeline.retriever(Arc::new(index))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use ragchat_core::{RagChatError, Result};
use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::loader::{DocumentLoader, TextLoader};
use crate::retriever::Retriever;

/// Builds vector indexes from a corpus and hands out retrievers over them.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    loader: Arc<dyn DocumentLoader>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Load the corpus at `path` and index it.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Loader`] if the corpus cannot be read, plus any
    /// error from [`index_document`](Self::index_document).
    pub async fn build_index(&self, path: &Path) -> Result<VectorIndex> {
        let document = self.loader.load(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to load corpus");
            e
        })?;
        self.index_document(&document).await
    }

    /// Split an already loaded document and embed every passage.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::EmptyCorpus`] if the document yields no passages
    /// and [`RagChatError::EmbeddingService`] if embedding fails.
    pub async fn index_document(&self, document: &Document) -> Result<VectorIndex> {
        let passages = self.chunker.split(document);
        info!(page_count = document.len(), passage_count = passages.len(), "split corpus");

        VectorIndex::build(passages, self.embedding_provider.as_ref(), self.config.embed_batch_size)
            .await
    }

    /// A [`Retriever`] over `index` using this pipeline's provider and `top_k`.
    pub fn retriever(&self, index: Arc<VectorIndex>) -> Result<Retriever> {
        Retriever::new(index, self.embedding_provider.clone(), self.config.top_k)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `embedding_provider` is required. `config` defaults to
/// [`RagConfig::default()`], `chunker` to a [`FixedSizeChunker`] sized from
/// the config, and `loader` to [`TextLoader`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    loader: Option<Arc<dyn DocumentLoader>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Build the [`RagPipeline`], validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] if the embedding provider is missing or
    /// the configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagChatError::Config("embedding_provider is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };
        let loader = self.loader.unwrap_or_else(|| Arc::new(TextLoader::new()));

        Ok(RagPipeline { config, embedding_provider, chunker, loader })
    }
}
