//! In-memory vector index using cosine similarity.
//!
//! [`VectorIndex`] is built once from a passage sequence and is read-only
//! afterwards, so it can be shared behind an `Arc` by every session without
//! locking.

use ragchat_core::{RagChatError, Result};
use tracing::{debug, error, info};

use crate::document::{Passage, RetrievedSet, SearchResult};
use crate::embedding::EmbeddingProvider;

/// An immutable collection of embedded passages with brute-force cosine search.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<(Passage, Vec<f32>)>,
    dimensions: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or a component is NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_nan() {
        return 0.0;
    }
    score
}

impl VectorIndex {
    /// Embed every passage and build the index.
    ///
    /// Passages are sent to the provider in batches of at most `batch_size`
    /// texts. Nothing is returned unless every passage was embedded.
    ///
    /// # Errors
    ///
    /// - [`RagChatError::EmptyCorpus`] if `passages` is empty.
    /// - [`RagChatError::Config`] if `batch_size` is zero.
    /// - [`RagChatError::EmbeddingService`] if the provider fails, returns the
    ///   wrong number of vectors, or returns vectors of differing dimension.
    pub async fn build(
        passages: Vec<Passage>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        if passages.is_empty() {
            error!("refusing to build an index over an empty corpus");
            return Err(RagChatError::EmptyCorpus);
        }
        if batch_size == 0 {
            return Err(RagChatError::Config("embed batch size must be greater than zero".into()));
        }

        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(passages.len());
        for (batch_index, batch) in passages.chunks(batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|p| p.text.as_str()).collect();
            debug!(batch_index, batch_size = texts.len(), "embedding passage batch");

            let vectors = provider.embed_batch(&texts).await.map_err(|e| {
                error!(batch_index, error = %e, "embedding failed during index build");
                e
            })?;
            if vectors.len() != texts.len() {
                return Err(RagChatError::embedding(
                    provider.name(),
                    format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
                ));
            }
            embeddings.extend(vectors);
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(RagChatError::embedding(
                provider.name(),
                "embeddings have inconsistent or zero dimensions",
            ));
        }

        let entries: Vec<(Passage, Vec<f32>)> = passages.into_iter().zip(embeddings).collect();
        info!(passage_count = entries.len(), dimensions, "built vector index");
        Ok(Self { entries, dimensions })
    }

    /// Return the `k` passages most similar to `query`, best first.
    ///
    /// Returns `min(k, len)` results ordered by non-increasing cosine score;
    /// equal scores keep original passage order.
    ///
    /// # Errors
    ///
    /// - [`RagChatError::Config`] if `k == 0`.
    /// - [`RagChatError::EmbeddingService`] if `query` has the wrong dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievedSet> {
        if k == 0 {
            return Err(RagChatError::Config("top_k must be greater than zero".to_string()));
        }
        if query.len() != self.dimensions {
            return Err(RagChatError::embedding(
                "index",
                format!(
                    "query vector has {} dimensions, index has {}",
                    query.len(),
                    self.dimensions
                ),
            ));
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(passage, embedding)| SearchResult {
                passage: passage.clone(),
                score: cosine_similarity(embedding, query),
            })
            .collect();

        // `sort_by` is stable, so ties stay in passage order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Iterate over the indexed passages in original order.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries.iter().map(|(p, _)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    fn passage(ordinal: usize) -> Passage {
        Passage {
            id: format!("doc#p1_{ordinal}"),
            text: format!("passage {ordinal}"),
            page_number: 1,
            source: "doc".to_string(),
            ordinal,
            metadata: Default::default(),
        }
    }

    #[test]
    fn nan_embedding_sorts_as_zero_score() {
        let index = VectorIndex {
            entries: vec![
                (passage(0), vec![f32::NAN, 1.0]),
                (passage(1), vec![1.0, 0.0]),
                (passage(2), vec![-1.0, 0.0]),
                (passage(3), vec![1.0, 1.0]),
            ],
            dimensions: 2,
        };

        let results = index.search(&[1.0, 0.0], 4).unwrap();
        let ordinals: Vec<usize> = results.iter().map(|r| r.passage.ordinal).collect();
        assert_eq!(ordinals, vec![1, 3, 0, 2]);
        assert_eq!(results[2].score, 0.0);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
