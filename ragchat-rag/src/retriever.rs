//! Query-time retrieval: embed a query string, then search the index.

use std::sync::Arc;

use ragchat_core::{RagChatError, Result};
use tracing::{error, info};

use crate::document::RetrievedSet;
use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;

/// Retrieves the `top_k` passages for a query from a built [`VectorIndex`].
///
/// Cheap to clone; the index and provider are shared.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] if `top_k == 0`.
    pub fn new(
        index: Arc<VectorIndex>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(RagChatError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(Self { index, embedding_provider, top_k })
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed `query` and return its nearest passages, best first.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::EmbeddingService`] if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedSet> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let results = self.index.search(&query_embedding, self.top_k)?;
        info!(result_count = results.len(), top_k = self.top_k, "retrieval completed");
        Ok(results)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("passages", &self.index.len())
            .field("embedding_provider", &self.embedding_provider.name())
            .field("top_k", &self.top_k)
            .finish()
    }
}
