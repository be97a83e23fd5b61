//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use ragchat_core::Result;

/// A provider that generates vector embeddings from text input.
///
/// This is the single boundary to the embedding service. Implementations
/// surface transport failures as
/// [`RagChatError::EmbeddingService`](ragchat_core::RagChatError::EmbeddingService)
/// and do not retry. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends with
/// native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A short provider name for logs and errors.
    fn name(&self) -> &str {
        "embedding"
    }
}
