//! Fixed system instructions.

/// Instruction for rewriting a follow-up into a self-contained question.
pub const CONTEXTUALIZE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can be \
understood without the chat history. Do NOT answer the question, just reformulate it if needed \
and otherwise return it as is.";

/// Instruction for grounded answering. `{context}` is replaced with the
/// retrieved passage texts.
pub const QA_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. Use the \
following pieces of retrieved context to answer the question. If you don't know the answer, say \
that you don't know. Use three sentences maximum and keep the answer concise.\n\n{context}";

/// Placeholder substituted by [`render_qa_prompt`].
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Fill the `{context}` slot of a QA template.
///
/// Templates without the placeholder get the context appended after a blank line.
pub fn render_qa_prompt(template: &str, context: &str) -> String {
    if template.contains(CONTEXT_PLACEHOLDER) {
        template.replace(CONTEXT_PLACEHOLDER, context)
    } else {
        format!("{template}\n\n{context}")
    }
}
