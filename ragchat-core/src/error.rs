//! Error types shared by every `ragchat` crate.

use thiserror::Error;

/// Errors that can occur anywhere in the question-answering pipeline.
///
/// Variants fall into two families. Precondition failures
/// ([`EmptyCorpus`](Self::EmptyCorpus), [`RetrieverNotConfigured`](Self::RetrieverNotConfigured),
/// [`Config`](Self::Config), [`InvalidInput`](Self::InvalidInput), ...) are raised
/// before any external call and are never worth retrying. Service failures
/// ([`EmbeddingService`](Self::EmbeddingService), [`GenerationService`](Self::GenerationService))
/// come from the network boundary and may succeed on a later attempt.
#[derive(Debug, Error)]
pub enum RagChatError {
    /// An index build was attempted over zero passages.
    #[error("Empty corpus: no passages to index")]
    EmptyCorpus,

    /// Retrieval was requested but no vector index is bound and none can be built.
    #[error("Retriever not configured: build an index or configure a corpus path first")]
    RetrieverNotConfigured,

    /// The embedding service failed or returned an unusable response.
    #[error("Embedding service error ({provider}): {message}")]
    EmbeddingService {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation service failed or returned an unusable response.
    #[error("Generation service error ({provider}): {message}")]
    GenerationService {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A strict session lookup referenced an id that was never created.
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document loader could not read the corpus.
    #[error("Loader error ({path}): {message}")]
    Loader {
        /// The path that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The caller supplied input that cannot be processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RagChatError {
    /// Build an [`EmbeddingService`](Self::EmbeddingService) error.
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingService { provider: provider.into(), message: message.into() }
    }

    /// Build a [`GenerationService`](Self::GenerationService) error.
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationService { provider: provider.into(), message: message.into() }
    }

    /// Returns `true` for errors raised by a failed precondition.
    ///
    /// These are actionable by the operator or caller and retrying the same
    /// call will fail the same way.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyCorpus
                | Self::RetrieverNotConfigured
                | Self::UnknownSession(_)
                | Self::Config(_)
                | Self::Loader { .. }
                | Self::InvalidInput(_)
        )
    }

    /// Returns `true` for failures at the external service boundary.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::EmbeddingService { .. } | Self::GenerationService { .. })
    }
}

/// A convenience result type for ragchat operations.
pub type Result<T> = std::result::Result<T, RagChatError>;
