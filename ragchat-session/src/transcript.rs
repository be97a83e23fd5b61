use chrono::{DateTime, Utc};
use ragchat_core::Turn;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// The ordered, append-only list of turns for one session.
///
/// Reads take a snapshot; [`push`](Self::push) is the only mutation.
/// Callers running a full question/answer exchange hold
/// [`lock_turn`](Self::lock_turn) for its duration so that two exchanges on
/// the same session never interleave.
#[derive(Debug)]
pub struct Transcript {
    session_id: String,
    created_at: DateTime<Utc>,
    turns: RwLock<Vec<Turn>>,
    turn_gate: Mutex<()>,
}

impl Transcript {
    pub(crate) fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            turns: RwLock::new(Vec::new()),
            turn_gate: Mutex::new(()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A snapshot of the turns, oldest first.
    pub async fn turns(&self) -> Vec<Turn> {
        self.turns.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }

    /// Append a turn to the end of the transcript.
    pub async fn push(&self, turn: Turn) {
        self.turns.write().await.push(turn);
    }

    /// Serialize whole exchanges on this session.
    pub async fn lock_turn(&self) -> MutexGuard<'_, ()> {
        self.turn_gate.lock().await
    }
}
