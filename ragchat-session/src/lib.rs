//! # ragchat-session
//!
//! Per-session conversation state. A [`SessionStore`] hands out one
//! [`Transcript`] per session id (get-or-create, atomic under concurrent
//! access); a transcript is an append-only list of [`Turn`]s.
//!
//! ```rust,ignore
//! use ragchat_session::SessionStore;
//!
//! let store = SessionStore::new();
//! let id = store.create_session().await;
//! store.append(&id, Turn::new("Hi", "Hello!")).await;
//! assert_eq!(store.transcript(&id).await.len().await, 1);
//! ```

mod store;
mod transcript;

pub use ragchat_core::Turn;
pub use store::SessionStore;
pub use transcript::Transcript;
