//! In-memory session store.
//!
//! Sessions are kept in a `HashMap` behind a `std::sync::Mutex` that is only
//! held for the duration of a map operation, never across an `.await`.
//! Each session keeps a sliding window of its most recent turns, and the
//! number of sessions is bounded: when full, the least recently updated
//! session is evicted to make room.

use laozihao_core::message::Message;
use laozihao_core::session::SessionStore;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

struct Session {
    turns: Vec<Message>,
    /// Value of the store clock at the last append
    touched: u64,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    clock: u64,
}

/// Process-lifetime session store.
pub struct InMemorySessionStore {
    history_limit: usize,
    max_sessions: usize,
    inner: Mutex<Inner>,
}

impl InMemorySessionStore {
    /// `history_limit` and `max_sessions` are clamped to at least 1.
    pub fn new(history_limit: usize, max_sessions: usize) -> Self {
        Self {
            history_limit: history_limit.max(1),
            max_sessions: max_sessions.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Vec<Message> {
        self.lock()
            .sessions
            .get(session_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    fn append(&self, session_id: &str, user: Message, assistant: Message) {
        let mut inner = self.lock();
        inner.clock += 1;
        let now = inner.clock;

        if !inner.sessions.contains_key(session_id) && inner.sessions.len() >= self.max_sessions {
            if let Some(oldest) = inner
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.touched)
                .map(|(k, _)| k.clone())
            {
                info!(session = %oldest, "Evicting least recently used session");
                inner.sessions.remove(&oldest);
            }
        }

        let session = inner
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session {
                turns: Vec::new(),
                touched: now,
            });

        session.turns.push(user);
        session.turns.push(assistant);
        if session.turns.len() > self.history_limit {
            let excess = session.turns.len() - self.history_limit;
            session.turns.drain(..excess);
        }
        session.touched = now;
    }

    fn clear(&self, session_id: &str) {
        self.lock().sessions.remove(session_id);
    }
}
