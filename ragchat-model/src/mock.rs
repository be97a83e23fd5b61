//! Scripted [`Llm`] for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ragchat_core::{Llm, Message, RagChatError, Result};

/// How a [`MockLlm`] produces replies.
enum Behavior {
    /// Pop replies in order; fail once exhausted.
    Script(VecDeque<Result<String>>),
    /// Compute the reply from the request.
    Respond(Box<dyn Fn(&[Message]) -> String + Send + Sync>),
}

/// A mock chat model that records every request it receives.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat_model::MockLlm;
///
/// let model = MockLlm::new("mock").with_reply("Paris");
/// let reply = model.generate(&[Message::user("Capital of France?")]).await?;
/// assert_eq!(model.calls().len(), 1);
/// ```
pub struct MockLlm {
    name: String,
    behavior: Mutex<Behavior>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// A mock with an empty script.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: Mutex::new(Behavior::Script(VecDeque::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always replies with the content of the last user message.
    pub fn echo(name: impl Into<String>) -> Self {
        Self::responding(name, |messages| {
            messages.last().map(|m| m.content.clone()).unwrap_or_default()
        })
    }

    /// A mock whose reply is computed from the request messages.
    pub fn responding<F>(name: impl Into<String>, respond: F) -> Self
    where
        F: Fn(&[Message]) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            behavior: Mutex::new(Behavior::Respond(Box::new(respond))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply. Has no effect on a `responding` mock.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure. Has no effect on a `responding` mock.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        let err = RagChatError::generation(self.name.clone(), message);
        self.push(Err(err));
        self
    }

    fn push(&self, item: Result<String>) {
        if let Behavior::Script(queue) = &mut *lock(&self.behavior) {
            queue.push_back(item);
        }
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        lock(&self.calls).push(messages.to_vec());
        match &mut *lock(&self.behavior) {
            Behavior::Script(queue) => queue.pop_front().unwrap_or_else(|| {
                Err(RagChatError::generation(self.name.clone(), "mock script exhausted"))
            }),
            Behavior::Respond(respond) => Ok(respond(messages)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_then_exhaustion() {
        let model = MockLlm::new("mock").with_reply("one").with_error("quota");

        assert_eq!(model.generate(&[Message::user("a")]).await.unwrap(), "one");
        assert!(model.generate(&[Message::user("b")]).await.unwrap_err().is_transient());
        assert!(model.generate(&[Message::user("c")]).await.is_err());
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.calls()[1][0].content, "b");
    }

    #[tokio::test]
    async fn echo_returns_last_message() {
        let model = MockLlm::echo("echo");
        let reply = model
            .generate(&[Message::system("sys"), Message::user("ping")])
            .await
            .unwrap();
        assert_eq!(reply, "ping");
    }
}
