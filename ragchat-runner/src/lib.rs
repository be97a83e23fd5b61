//! # ragchat-runner
//!
//! Per-turn orchestration for ragchat:
//!
//! - [`QueryContextualizer`] rewrites a follow-up into a standalone query and
//!   retrieves passages for it.
//! - [`AnswerGenerator`] answers from those passages and the transcript.
//! - [`ConversationOrchestrator`] ties both to a [`SessionStore`](ragchat_session::SessionStore)
//!   and owns the lazily built index.

pub mod answer;
pub mod contextualizer;
pub mod orchestrator;
pub mod prompts;

pub use answer::AnswerGenerator;
pub use contextualizer::{Contextualized, QueryContextualizer, QueryContextualizerBuilder};
pub use orchestrator::{
    ChatMode, ConversationOrchestrator, ConversationOrchestratorBuilder, OrchestratorState,
};
