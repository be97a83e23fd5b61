use std::collections::HashMap;
use std::sync::Arc;

use ragchat_core::{RagChatError, Result, Turn};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::transcript::Transcript;

/// Maps session ids to their [`Transcript`]s.
///
/// Cloning the store shares the underlying map. Transcripts are created on
/// first reference and live for the rest of the process.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Transcript>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session under a random UUID and return its id.
    pub async fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.transcript(&session_id).await;
        info!(session.id = %session_id, "created session");
        session_id
    }

    /// Return the transcript for `session_id`, creating an empty one if absent.
    ///
    /// Creation happens under the map's write lock, so concurrent first
    /// references to the same id all receive the same `Arc`.
    pub async fn transcript(&self, session_id: &str) -> Arc<Transcript> {
        if let Some(transcript) = self.sessions.read().await.get(session_id) {
            return transcript.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session.id = %session_id, "creating transcript");
                Arc::new(Transcript::new(session_id))
            })
            .clone()
    }

    /// Like [`transcript`](Self::transcript) but never creates.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::UnknownSession`] if the id was never seen.
    pub async fn transcript_strict(&self, session_id: &str) -> Result<Arc<Transcript>> {
        self.get(session_id)
            .await
            .ok_or_else(|| RagChatError::UnknownSession(session_id.to_string()))
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<Transcript>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Append a turn to the session's transcript, creating it if needed.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        self.transcript(session_id).await.push(turn).await;
    }

    /// Known session ids, sorted.
    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
