//! Grounded answer generation.

use std::sync::Arc;

use ragchat_core::{Llm, Result, Turn, conversation};
use ragchat_rag::RetrievedSet;
use tracing::{error, info};

use crate::prompts::{QA_SYSTEM_PROMPT, render_qa_prompt};

/// Separator between passages in the context block.
const PASSAGE_SEPARATOR: &str = "\n\n";

/// Answers a question from retrieved passages and the running transcript.
///
/// The reply text is returned exactly as the model produced it.
pub struct AnswerGenerator {
    llm: Arc<dyn Llm>,
    prompt_template: String,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, prompt_template: QA_SYSTEM_PROMPT.to_string() }
    }

    /// Replace the system instruction template (`{context}` marks where
    /// passages go).
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Generate an answer. An empty `passages` set is passed through as an
    /// empty context.
    pub async fn answer(
        &self,
        turns: &[Turn],
        passages: &RetrievedSet,
        question: &str,
    ) -> Result<String> {
        let context = passages
            .iter()
            .map(|r| r.passage.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);
        let system = render_qa_prompt(&self.prompt_template, &context);

        let messages = conversation(Some(system), turns, question);
        let answer = self.llm.generate(&messages).await.map_err(|e| {
            error!(model = self.llm.name(), error = %e, "answer generation failed");
            e
        })?;
        info!(passage_count = passages.len(), answer_len = answer.len(), "generated answer");
        Ok(answer)
    }
}
