//! Chat messages and conversation turns.

use serde::{Deserialize, Serialize};

/// The author of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The human asking questions.
    User,
    /// The model's replies.
    Assistant,
}

impl Role {
    /// The wire name used by OpenAI-compatible chat APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single entry in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One completed exchange: the user's original question and the final answer.
///
/// The standalone query derived during contextualization is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

/// Render prior turns as alternating user/assistant messages, oldest first.
pub fn history_messages(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .flat_map(|turn| [Message::user(&turn.question), Message::assistant(&turn.answer)])
        .collect()
}

/// Build a full generation request: optional system instruction, prior turns,
/// then the new question as the final user message.
pub fn conversation(system: Option<String>, turns: &[Turn], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(turns.len() * 2 + 2);
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.extend(history_messages(turns));
    messages.push(Message::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_interleaves_turns_before_question() {
        let turns = vec![Turn::new("My name is David.", "Hello David.")];
        let messages = conversation(Some("be brief".into()), &turns, "What is my name?");

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[1].content, "My name is David.");
        assert_eq!(messages[3].content, "What is my name?");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
