//! The generation-service boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A chat model that turns an ordered list of messages into reply text.
///
/// Implementations are expected to surface every transport, timeout or quota
/// failure as [`RagChatError::GenerationService`](crate::RagChatError::GenerationService)
/// and must not retry internally.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_core::{Llm, Message};
///
/// let reply = model.generate(&[Message::user("Hello")]).await?;
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Run one generation call and return the reply text.
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}
