//! # ragchat-core
//!
//! Shared building blocks for the ragchat pipeline: the [`RagChatError`]
//! type, chat [`Message`]s and conversation [`Turn`]s, and the [`Llm`] trait
//! that every generation backend implements.

pub mod error;
pub mod llm;
pub mod message;

pub use error::{RagChatError, Result};
pub use llm::Llm;
pub use message::{Message, Role, Turn, conversation, history_messages};
