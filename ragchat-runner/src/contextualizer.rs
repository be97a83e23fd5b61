//! History-aware retrieval.
//!
//! A follow-up such as "what about part-time staff?" cannot be embedded on
//! its own. [`QueryContextualizer`] first asks the model to rewrite it into a
//! standalone question using the transcript, then retrieves passages for the
//! rewritten question. It never answers.

use std::sync::Arc;

use ragchat_core::{Llm, Message, RagChatError, Result, Turn, conversation};
use ragchat_rag::{RetrievedSet, Retriever};
use tracing::{debug, error, info};

use crate::prompts::CONTEXTUALIZE_SYSTEM_PROMPT;

/// The result of contextualizing one question.
#[derive(Debug, Clone)]
pub struct Contextualized {
    /// The self-contained query that was embedded and searched.
    pub standalone_query: String,
    /// Passages for that query, best first.
    pub passages: RetrievedSet,
}

/// Rewrites questions against the transcript and retrieves passages for them.
///
/// Owns its [`Retriever`], so a contextualizer always has an index to search.
pub struct QueryContextualizer {
    llm: Arc<dyn Llm>,
    retriever: Retriever,
    system_prompt: String,
}

impl QueryContextualizer {
    pub fn new(llm: Arc<dyn Llm>, retriever: Retriever) -> Self {
        Self { llm, retriever, system_prompt: CONTEXTUALIZE_SYSTEM_PROMPT.to_string() }
    }

    pub fn builder() -> QueryContextualizerBuilder {
        QueryContextualizerBuilder::default()
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Produce the standalone query for `question`.
    ///
    /// With an empty transcript the question is returned verbatim and no
    /// generation call is made. Otherwise the model's output text is used as is.
    pub async fn standalone_query(&self, turns: &[Turn], question: &str) -> Result<String> {
        if turns.is_empty() {
            debug!("empty transcript, using question verbatim");
            return Ok(question.to_string());
        }

        let messages: Vec<Message> =
            conversation(Some(self.system_prompt.clone()), turns, question);
        let rewritten = self.llm.generate(&messages).await.map_err(|e| {
            error!(model = self.llm.name(), error = %e, "question rewrite failed");
            e
        })?;
        info!(history_turns = turns.len(), standalone_query = %rewritten, "rewrote question");
        Ok(rewritten)
    }

    /// Rewrite `question` against `turns`, then retrieve passages for the result.
    pub async fn contextualize(&self, turns: &[Turn], question: &str) -> Result<Contextualized> {
        let standalone_query = self.standalone_query(turns, question).await?;
        let passages = self.retriever.retrieve(&standalone_query).await?;
        Ok(Contextualized { standalone_query, passages })
    }
}

/// Builder for [`QueryContextualizer`].
#[derive(Default)]
pub struct QueryContextualizerBuilder {
    llm: Option<Arc<dyn Llm>>,
    retriever: Option<Retriever>,
    system_prompt: Option<String>,
}

impl QueryContextualizerBuilder {
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Override the rewrite instruction.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// # Errors
    ///
    /// - [`RagChatError::RetrieverNotConfigured`] if no retriever was supplied.
    /// - [`RagChatError::Config`] if no model was supplied.
    pub fn build(self) -> Result<QueryContextualizer> {
        let retriever = self.retriever.ok_or(RagChatError::RetrieverNotConfigured)?;
        let llm = self.llm.ok_or_else(|| RagChatError::Config("llm is required".to_string()))?;
        let mut contextualizer = QueryContextualizer::new(llm, retriever);
        if let Some(prompt) = self.system_prompt {
            contextualizer.system_prompt = prompt;
        }
        Ok(contextualizer)
    }
}
