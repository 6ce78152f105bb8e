//! Session-keyed conversation history.
//!
//! The chain depends on the [`SessionStore`] capability rather than a
//! process-wide global, so lifecycle and persistence are the caller's
//! choice. The in-memory store lives for the process lifetime, creates a
//! history on first reference, and is safe for concurrent access across
//! distinct session ids; writes to the same id serialize on the map lock.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::ChatTurn;

pub trait SessionStore: Send + Sync {
    /// The ordered turns recorded for `session_id`; empty for a fresh session.
    fn history(&self, session_id: &str) -> Vec<ChatTurn>;

    /// Append one turn to `session_id`'s history, creating it if needed.
    fn append(&self, session_id: &str, turn: ChatTurn);
}

/// Process-lifetime store with no expiry or persistence.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        let sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    fn append(&self, session_id: &str, turn: ChatTurn) {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.entry(session_id.to_string()).or_default().push(turn);
    }
}
