//! Session store trait: short-lived per-session chat history.
//!
//! A session groups the turns exchanged under one client-chosen identifier.
//! History lives only in process memory and is capped to a sliding window of
//! the most recent turns.

use crate::message::Message;

/// Session identifier used when the client does not send one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// The session store abstraction.
///
/// Implementations own their synchronization; callers only ever see these
/// three operations.
pub trait SessionStore: Send + Sync {
    /// The stored turns for `session_id`, oldest first. Empty if unseen.
    fn get(&self, session_id: &str) -> Vec<Message>;

    /// Append one user/assistant exchange, then keep only the most recent
    /// turns allowed by the store's history limit.
    fn append(&self, session_id: &str, user: Message, assistant: Message);

    /// Forget the session entirely.
    fn clear(&self, session_id: &str);
}
